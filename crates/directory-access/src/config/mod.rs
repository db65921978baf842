use std::collections::BTreeSet;
use std::env;
use std::fmt;

use crate::access::resource::{BODY_FIELD, DISPLAY_ORDER_FIELD, TITLE_FIELD};
use crate::moderation::{default_substantive_fields, ModerationPolicy};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub moderation: ModerationPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ModerationPolicy::default();
        let moderation = ModerationPolicy {
            reopen_rejected_on_edit: flag(
                "MODERATION_REOPEN_REJECTED_ON_EDIT",
                defaults.reopen_rejected_on_edit,
            )?,
            publish_on_approve: flag("MODERATION_PUBLISH_ON_APPROVE", defaults.publish_on_approve)?,
            substantive_fields: substantive_fields()?,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            moderation,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value: raw }),
    }
}

fn substantive_fields() -> Result<BTreeSet<String>, ConfigError> {
    let Ok(raw) = env::var("MODERATION_SUBSTANTIVE_FIELDS") else {
        return Ok(default_substantive_fields());
    };

    let fields: BTreeSet<String> = raw
        .split(',')
        .map(|field| field.trim().to_ascii_lowercase())
        .filter(|field| !field.is_empty())
        .collect();

    if fields.is_empty() {
        return Err(ConfigError::EmptySubstantiveFields);
    }
    if let Some(name) = fields
        .iter()
        .find(|field| ![TITLE_FIELD, BODY_FIELD, DISPLAY_ORDER_FIELD].contains(&field.as_str()))
    {
        return Err(ConfigError::UnknownSubstantiveField { name: name.clone() });
    }
    // Title and body edits always go back to review; the override may only widen the set.
    if let Some(name) = [TITLE_FIELD, BODY_FIELD]
        .into_iter()
        .find(|required| !fields.contains(*required))
    {
        return Err(ConfigError::MissingSubstantiveField { name });
    }
    Ok(fields)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidFlag { name: &'static str, value: String },
    EmptySubstantiveFields,
    UnknownSubstantiveField { name: String },
    MissingSubstantiveField { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean (got '{value}')")
            }
            ConfigError::EmptySubstantiveFields => {
                write!(f, "MODERATION_SUBSTANTIVE_FIELDS must name at least one field")
            }
            ConfigError::UnknownSubstantiveField { name } => write!(
                f,
                "MODERATION_SUBSTANTIVE_FIELDS names unknown field '{name}' \
                 (expected {TITLE_FIELD}, {BODY_FIELD} or {DISPLAY_ORDER_FIELD})"
            ),
            ConfigError::MissingSubstantiveField { name } => {
                write!(f, "MODERATION_SUBSTANTIVE_FIELDS must include '{name}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
