use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::access::{ResourceId, UserId};

/// Outbound notification raised by a moderation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModerationEvent {
    ContentApproved {
        resource_id: ResourceId,
        owner_id: UserId,
    },
    ContentRejected {
        resource_id: ResourceId,
        owner_id: UserId,
        reason: String,
    },
}

impl ModerationEvent {
    pub fn resource_id(&self) -> &ResourceId {
        match self {
            ModerationEvent::ContentApproved { resource_id, .. }
            | ModerationEvent::ContentRejected { resource_id, .. } => resource_id,
        }
    }

    pub fn owner_id(&self) -> &UserId {
        match self {
            ModerationEvent::ContentApproved { owner_id, .. }
            | ModerationEvent::ContentRejected { owner_id, .. } => owner_id,
        }
    }

    pub const fn template(&self) -> &'static str {
        match self {
            ModerationEvent::ContentApproved { .. } => "content_approved",
            ModerationEvent::ContentRejected { .. } => "content_rejected",
        }
    }

    /// Render the owner-facing notice handed to the delivery collaborator.
    pub fn notification(&self) -> Notification {
        let message = match self {
            ModerationEvent::ContentApproved { resource_id, .. } => {
                format!("Your submission {resource_id} has been approved and is now live.")
            }
            ModerationEvent::ContentRejected {
                resource_id,
                reason,
                ..
            } => format!("Your submission {resource_id} was rejected: {reason}"),
        };

        Notification {
            recipient: self.owner_id().clone(),
            template: self.template().to_string(),
            resource_id: self.resource_id().clone(),
            message,
        }
    }
}

/// Delivery-agnostic notice; e-mail, in-app, or push is the consumer's choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: UserId,
    pub template: String,
    pub resource_id: ResourceId,
    pub message: String,
}

/// Outbound event hook (mailer queue, in-app inbox, ...).
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: ModerationEvent) -> Result<(), PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event channel closed")]
    Closed,
    #[error("event transport unavailable: {0}")]
    Transport(String),
}

/// Non-blocking publisher backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: UnboundedSender<ModerationEvent>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, UnboundedReceiver<ModerationEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: ModerationEvent) -> Result<(), PublishError> {
        self.sender.send(event).map_err(|_| PublishError::Closed)
    }
}
