//! Review workflow for submitted directory content.
//!
//! [`ModerationStateMachine`] holds the pure pending/approved/rejected rules.
//! [`ModerationService`] wraps it with authorization checks, persistence, and
//! event emission for the surrounding application.

pub mod events;
pub mod machine;
pub mod repository;
pub mod service;
mod status;

#[cfg(test)]
mod tests;

pub use events::{ChannelPublisher, EventPublisher, ModerationEvent, Notification, PublishError};
pub use machine::{
    default_substantive_fields, InvalidTransition, ModerationPolicy, ModerationStateMachine,
    Transition,
};
pub use repository::{RepositoryError, ResourceRepository};
pub use service::{ModerationService, ModerationServiceError};
pub use status::ModerationStatus;
