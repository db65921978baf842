use crate::infra::{spawn_notification_inbox, InMemoryResourceRepository};
use chrono::Utc;
use clap::Args;
use directory_access::access::{
    ModeratedResource, ResourceContent, ResourceKind, Role, RoleCapabilityTable, Subject,
};
use directory_access::error::AppError;
use directory_access::moderation::{
    ChannelPublisher, ModerationPolicy, ModerationService, ModerationServiceError,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Reason the admin gives when rejecting the edited listing
    #[arg(long, default_value = "Inappropriate content")]
    pub(crate) reason: String,
    /// Print delivered notifications as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_demo(args: DemoArgs, policy: ModerationPolicy) -> Result<(), AppError> {
    let DemoArgs { reason, json } = args;

    let owner = Subject::new("7", Role::Business);
    let admin = Subject::new("1", Role::Admin);
    let member = Subject::new("9", Role::Free);

    let repository = Arc::new(InMemoryResourceRepository::default());
    let (publisher, receiver) = ChannelPublisher::new();
    let inbox = spawn_notification_inbox(receiver);
    let service = ModerationService::new(repository, Arc::new(publisher), policy);
    let active = service.machine().policy();

    println!("Moderation walkthrough ({})", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!(
        "- reopen rejected on edit: {} | publish on approve: {}",
        active.reopen_rejected_on_edit, active.publish_on_approve
    );
    println!(
        "- substantive fields: {}",
        active
            .substantive_fields
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    for subject in [&owner, &admin, &member] {
        println!(
            "- user {} is a {} with {} permissions",
            subject.id,
            RoleCapabilityTable::label(subject.role),
            subject.role.permissions().len()
        );
    }

    let content = ResourceContent::new(
        "Harbor Street Bakery",
        "Sourdough, pastries, and custom cakes baked daily.",
    );

    println!("\nSubmission");
    report_denial(
        "free member creates a listing",
        service.create(Some(&member), ResourceKind::Listing, content.clone()),
    )?;
    let listing = service.create(Some(&owner), ResourceKind::Listing, content.clone())?;
    print_resource("owner submitted", &listing);
    println!(
        "  anonymous visitor can view: {}",
        service.decider().view(None, &listing)
    );

    println!("\nReview");
    let listing = service.approve(Some(&admin), &listing.id)?;
    print_resource("admin approved", &listing);
    let listing = service.approve(Some(&admin), &listing.id)?;
    print_resource("admin approved again (no-op)", &listing);
    println!(
        "  anonymous visitor can view: {}",
        service.decider().view(None, &listing)
    );

    println!("\nEdits");
    let mut reordered = listing.content.clone();
    reordered.display_order = 2;
    let listing = service.update_content(Some(&owner), &listing.id, reordered.clone())?;
    print_resource("owner changed display order", &listing);

    let retitled = ResourceContent {
        title: "Harbor Street Bakery & Cafe".to_string(),
        ..reordered
    };
    let listing = service.update_content(Some(&owner), &listing.id, retitled)?;
    print_resource("owner changed the title", &listing);

    report_denial(
        "free member edits the listing",
        service.update_content(Some(&member), &listing.id, content),
    )?;
    report_denial(
        "owner permanently deletes the listing",
        service.force_delete(Some(&owner), &listing.id),
    )?;

    let queue = service.review_queue(Some(&admin), 10)?;
    println!("  review queue: {} pending", queue.len());

    println!("\nRejection");
    report_denial(
        "admin rejects without a reason",
        service.reject(Some(&admin), &listing.id, " "),
    )?;
    let listing = service.reject(Some(&admin), &listing.id, &reason)?;
    print_resource("admin rejected", &listing);

    drop(service);
    let notifications = inbox
        .await
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;

    println!("\nNotifications delivered");
    if json {
        println!("{}", serde_json::to_string_pretty(&notifications)?);
    } else {
        for notice in &notifications {
            println!(
                "- to user {} [{}]: {}",
                notice.recipient, notice.template, notice.message
            );
        }
    }

    Ok(())
}

fn print_resource(step: &str, resource: &ModeratedResource) {
    println!(
        "- {}: {} '{}' -> {} (visible: {})",
        step,
        resource.id,
        resource.content.title,
        resource.status_label(),
        resource.is_active
    );
    if let Some(reason) = &resource.rejection_reason {
        println!("  rejection reason: {}", reason);
    }
}

// Expected denials are printed; anything else aborts the demo.
fn report_denial<T>(step: &str, result: Result<T, ModerationServiceError>) -> Result<(), AppError> {
    match result {
        Ok(_) => {
            println!("- {}: unexpectedly allowed", step);
            Ok(())
        }
        Err(err @ ModerationServiceError::Forbidden { .. })
        | Err(err @ ModerationServiceError::Transition(_)) => {
            println!("- {}: refused ({})", step, err);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
