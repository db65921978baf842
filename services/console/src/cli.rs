use crate::demo::{run_demo, DemoArgs};
use clap::{Args, Parser, Subcommand};
use directory_access::access::{
    Action, AuthorizationDecider, ModeratedResource, ResourceContent, ResourceId, ResourceKind,
    Role, RoleCapabilityTable, Subject, UserId,
};
use directory_access::config::AppConfig;
use directory_access::error::AppError;
use directory_access::telemetry;
use serde::Serialize;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "Directory Access Console",
    about = "Inspect role capabilities and walk through content moderation from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the role capability table (default command)
    Permissions(PermissionsArgs),
    /// Evaluate a single authorization decision
    Check(CheckArgs),
    /// Run an end-to-end moderation demo against in-memory collaborators
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct PermissionsArgs {
    /// Limit output to one role (free, business, admin)
    #[arg(long)]
    pub(crate) role: Option<String>,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Action to evaluate (viewAny, view, create, update, delete, restore, forceDelete)
    #[arg(long)]
    pub(crate) action: String,
    /// Role of the requesting user; omit for an anonymous request
    #[arg(long)]
    pub(crate) role: Option<String>,
    /// Id of the requesting user
    #[arg(long, default_value = "1")]
    pub(crate) user_id: String,
    /// Owner of the target resource (defaults to the requesting user)
    #[arg(long)]
    pub(crate) owner_id: Option<String>,
    /// Treat the target resource as unpublished
    #[arg(long)]
    pub(crate) inactive: bool,
}

#[derive(Debug, Serialize)]
struct RoleView {
    role: Role,
    label: &'static str,
    permissions: Vec<&'static str>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, "configuration loaded");

    let command = cli
        .command
        .unwrap_or_else(|| Command::Permissions(PermissionsArgs::default()));

    match command {
        Command::Permissions(args) => run_permissions(args),
        Command::Check(args) => run_check(args),
        Command::Demo(args) => run_demo(args, config.moderation).await,
    }
}

fn run_permissions(args: PermissionsArgs) -> Result<(), AppError> {
    let roles = match args.role {
        Some(raw) => vec![raw.parse::<Role>()?],
        None => Role::ALL.to_vec(),
    };

    let views: Vec<RoleView> = roles
        .into_iter()
        .map(|role| RoleView {
            role,
            label: RoleCapabilityTable::label(role),
            permissions: RoleCapabilityTable::permission_names(role)
                .into_iter()
                .collect(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for view in views {
        println!("{} ({})", view.label, view.role);
        for permission in view.permissions {
            println!("  - {}", permission);
        }
    }
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let action: Action = args.action.parse()?;
    let subject = args
        .role
        .as_deref()
        .map(|raw| raw.parse::<Role>().map(|role| Subject::new(args.user_id.clone(), role)))
        .transpose()?;

    let owner = args.owner_id.unwrap_or_else(|| args.user_id.clone());
    let mut resource = ModeratedResource::draft(
        ResourceId("res-check".to_string()),
        ResourceKind::Listing,
        UserId::new(owner),
        ResourceContent::new("", ""),
    );
    resource.is_active = !args.inactive;

    let allowed = AuthorizationDecider::new().decide(action, subject.as_ref(), Some(&resource));
    let who = match &subject {
        Some(subject) => format!("{} {}", subject.role, subject.id),
        None => "anonymous".to_string(),
    };
    println!(
        "{} -> {} on {} resource owned by {}: {}",
        who,
        action,
        if resource.is_active { "published" } else { "unpublished" },
        resource.owner_id,
        if allowed { "allowed" } else { "denied" }
    );
    Ok(())
}
