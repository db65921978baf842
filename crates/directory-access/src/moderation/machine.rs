use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::events::ModerationEvent;
use super::status::ModerationStatus;
use crate::access::resource::{BODY_FIELD, TITLE_FIELD};
use crate::access::{ModeratedResource, ResourceId, ResourceKind};

/// Tunable behavior of the review workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationPolicy {
    /// Send rejected content back to review when a substantive field is edited.
    pub reopen_rejected_on_edit: bool,
    /// Keep `is_active` in step with approval.
    pub publish_on_approve: bool,
    pub substantive_fields: BTreeSet<String>,
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self {
            reopen_rejected_on_edit: false,
            publish_on_approve: true,
            substantive_fields: default_substantive_fields(),
        }
    }
}

pub fn default_substantive_fields() -> BTreeSet<String> {
    [TITLE_FIELD, BODY_FIELD]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Transition requested on a resource that cannot take it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTransition {
    #[error("a non-empty rejection reason is required")]
    MissingReason,
    #[error("{kind} resources are not subject to editorial review")]
    NoReviewWorkflow { kind: ResourceKind },
    #[error("resource {resource_id} has been deleted")]
    Deleted { resource_id: ResourceId },
}

/// Result of a state-machine call.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub resource: ModeratedResource,
    /// Notification to emit once the new state is persisted.
    pub event: Option<ModerationEvent>,
    pub changed: bool,
}

impl Transition {
    fn unchanged(resource: &ModeratedResource) -> Self {
        Self {
            resource: resource.clone(),
            event: None,
            changed: false,
        }
    }
}

/// Pure pending/approved/rejected workflow. Inputs are never mutated.
#[derive(Debug, Clone, Default)]
pub struct ModerationStateMachine {
    policy: ModerationPolicy,
}

impl ModerationStateMachine {
    pub fn new(policy: ModerationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ModerationPolicy {
        &self.policy
    }

    /// Initial state for freshly created content.
    pub fn submit(&self, mut resource: ModeratedResource) -> ModeratedResource {
        resource.rejection_reason = None;
        if resource.kind.requires_review() {
            resource.moderation_status = Some(ModerationStatus::Pending);
            resource.is_active = false;
        } else {
            resource.moderation_status = None;
            resource.is_active = true;
        }
        resource
    }

    pub fn approve(&self, resource: &ModeratedResource) -> Result<Transition, InvalidTransition> {
        let status = self.reviewable_status(resource)?;
        if status == ModerationStatus::Approved {
            debug!(resource_id = %resource.id, "approve on approved resource is a no-op");
            return Ok(Transition::unchanged(resource));
        }

        let mut next = resource.clone();
        next.moderation_status = Some(ModerationStatus::Approved);
        next.rejection_reason = None;
        if self.policy.publish_on_approve {
            next.is_active = true;
        }

        let event = ModerationEvent::ContentApproved {
            resource_id: next.id.clone(),
            owner_id: next.owner_id.clone(),
        };

        Ok(Transition {
            resource: next,
            event: Some(event),
            changed: true,
        })
    }

    pub fn reject(
        &self,
        resource: &ModeratedResource,
        reason: &str,
    ) -> Result<Transition, InvalidTransition> {
        if reason.trim().is_empty() {
            return Err(InvalidTransition::MissingReason);
        }

        let status = self.reviewable_status(resource)?;
        if status == ModerationStatus::Rejected {
            debug!(resource_id = %resource.id, "reject on rejected resource is a no-op");
            return Ok(Transition::unchanged(resource));
        }

        let mut next = resource.clone();
        next.moderation_status = Some(ModerationStatus::Rejected);
        next.rejection_reason = Some(reason.to_string());
        if self.policy.publish_on_approve {
            next.is_active = false;
        }

        let event = ModerationEvent::ContentRejected {
            resource_id: next.id.clone(),
            owner_id: next.owner_id.clone(),
            reason: reason.to_string(),
        };

        Ok(Transition {
            resource: next,
            event: Some(event),
            changed: true,
        })
    }

    /// Republishing substantive changes requires another review.
    pub fn edit_content(
        &self,
        resource: &ModeratedResource,
        changed_fields: &BTreeSet<String>,
    ) -> Transition {
        let substantive = changed_fields
            .iter()
            .any(|field| self.policy.substantive_fields.contains(field));

        let reopen = match resource.moderation_status {
            Some(ModerationStatus::Approved) => substantive,
            Some(ModerationStatus::Rejected) => substantive && self.policy.reopen_rejected_on_edit,
            Some(ModerationStatus::Pending) | None => false,
        };

        if !reopen {
            return Transition::unchanged(resource);
        }

        let mut next = resource.clone();
        next.moderation_status = Some(ModerationStatus::Pending);
        next.rejection_reason = None;
        if self.policy.publish_on_approve {
            next.is_active = false;
        }

        Transition {
            resource: next,
            event: None,
            changed: true,
        }
    }

    fn reviewable_status(
        &self,
        resource: &ModeratedResource,
    ) -> Result<ModerationStatus, InvalidTransition> {
        if resource.is_deleted() {
            return Err(InvalidTransition::Deleted {
                resource_id: resource.id.clone(),
            });
        }
        resource
            .moderation_status
            .ok_or(InvalidTransition::NoReviewWorkflow {
                kind: resource.kind,
            })
    }
}
