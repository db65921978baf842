use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::events::{EventPublisher, ModerationEvent};
use super::machine::{InvalidTransition, ModerationPolicy, ModerationStateMachine, Transition};
use super::repository::{RepositoryError, ResourceRepository};
use crate::access::{
    AuthorizationDecider, ModeratedResource, ResourceContent, ResourceId, ResourceKind, Subject,
};

/// Facade composing the decider, the state machine, storage, and event hooks.
pub struct ModerationService<R, E> {
    decider: AuthorizationDecider,
    machine: Arc<ModerationStateMachine>,
    repository: Arc<R>,
    events: Arc<E>,
}

static RESOURCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_resource_id() -> ResourceId {
    let id = RESOURCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ResourceId(format!("res-{id:06}"))
}

impl<R, E> ModerationService<R, E>
where
    R: ResourceRepository + 'static,
    E: EventPublisher + 'static,
{
    pub fn new(repository: Arc<R>, events: Arc<E>, policy: ModerationPolicy) -> Self {
        Self {
            decider: AuthorizationDecider::new(),
            machine: Arc::new(ModerationStateMachine::new(policy)),
            repository,
            events,
        }
    }

    pub fn decider(&self) -> &AuthorizationDecider {
        &self.decider
    }

    pub fn machine(&self) -> &ModerationStateMachine {
        &self.machine
    }

    /// Create content owned by `subject`; review kinds start out pending.
    pub fn create(
        &self,
        subject: Option<&Subject>,
        kind: ResourceKind,
        content: ResourceContent,
    ) -> Result<ModeratedResource, ModerationServiceError> {
        let subject = match subject {
            Some(subject) if self.decider.create(Some(subject)) => subject,
            _ => return Err(denied("create", subject)),
        };

        let draft =
            ModeratedResource::draft(next_resource_id(), kind, subject.id.clone(), content);
        let stored = self.repository.insert(self.machine.submit(draft))?;

        info!(
            resource_id = %stored.id,
            kind = %stored.kind,
            owner_id = %stored.owner_id,
            status = stored.status_label(),
            "resource created"
        );
        Ok(stored)
    }

    /// Fetch a resource the subject may see. Soft-deleted content is hidden from non-admins.
    pub fn get(
        &self,
        subject: Option<&Subject>,
        id: &ResourceId,
    ) -> Result<ModeratedResource, ModerationServiceError> {
        let resource = self.load(id)?;
        if resource.is_deleted() && !subject.is_some_and(Subject::is_admin) {
            return Err(RepositoryError::NotFound.into());
        }
        if !self.decider.view(subject, &resource) {
            return Err(denied("view", subject));
        }
        Ok(resource)
    }

    /// Replace the editable content, sending approved content back to review when needed.
    pub fn update_content(
        &self,
        subject: Option<&Subject>,
        id: &ResourceId,
        content: ResourceContent,
    ) -> Result<ModeratedResource, ModerationServiceError> {
        let resource = self.load_live(id)?;
        if !self.decider.update(subject, &resource) {
            return Err(denied("update", subject));
        }

        let changed_fields = resource.content.changed_fields(&content);
        if changed_fields.is_empty() {
            return Ok(resource);
        }

        let mut edited = resource;
        edited.content = content;
        let transition = self.machine.edit_content(&edited, &changed_fields);
        if transition.changed {
            info!(resource_id = %edited.id, "substantive edit returned resource to review");
        }

        Ok(self.repository.update(transition.resource)?)
    }

    /// Soft delete.
    pub fn delete(
        &self,
        subject: Option<&Subject>,
        id: &ResourceId,
    ) -> Result<ModeratedResource, ModerationServiceError> {
        let mut resource = self.load_live(id)?;
        if !self.decider.delete(subject, &resource) {
            return Err(denied("delete", subject));
        }

        resource.deleted_at = Some(Utc::now());
        let stored = self.repository.update(resource)?;
        info!(resource_id = %stored.id, "resource soft deleted");
        Ok(stored)
    }

    pub fn restore(
        &self,
        subject: Option<&Subject>,
        id: &ResourceId,
    ) -> Result<ModeratedResource, ModerationServiceError> {
        let mut resource = self.load(id)?;
        if !self.decider.restore(subject, &resource) {
            return Err(denied("restore", subject));
        }
        if !resource.is_deleted() {
            return Ok(resource);
        }

        resource.deleted_at = None;
        let stored = self.repository.update(resource)?;
        info!(resource_id = %stored.id, "resource restored");
        Ok(stored)
    }

    pub fn force_delete(
        &self,
        subject: Option<&Subject>,
        id: &ResourceId,
    ) -> Result<(), ModerationServiceError> {
        let resource = self.load(id)?;
        if !self.decider.force_delete(subject, &resource) {
            return Err(denied("forceDelete", subject));
        }

        self.repository.remove(&resource.id)?;
        info!(resource_id = %resource.id, "resource permanently deleted");
        Ok(())
    }

    pub fn approve(
        &self,
        subject: Option<&Subject>,
        id: &ResourceId,
    ) -> Result<ModeratedResource, ModerationServiceError> {
        if !self.decider.moderate(subject) {
            return Err(denied("approve", subject));
        }

        let resource = self.load(id)?;
        let transition = self.machine.approve(&resource)?;
        self.commit(transition, "approved")
    }

    pub fn reject(
        &self,
        subject: Option<&Subject>,
        id: &ResourceId,
        reason: &str,
    ) -> Result<ModeratedResource, ModerationServiceError> {
        if !self.decider.moderate(subject) {
            return Err(denied("reject", subject));
        }

        let resource = self.load(id)?;
        let transition = self.machine.reject(&resource, reason)?;
        self.commit(transition, "rejected")
    }

    /// Pending submissions for the admin review screen.
    pub fn review_queue(
        &self,
        subject: Option<&Subject>,
        limit: usize,
    ) -> Result<Vec<ModeratedResource>, ModerationServiceError> {
        if !self.decider.moderate(subject) {
            return Err(denied("review", subject));
        }
        Ok(self.repository.pending(limit)?)
    }

    fn commit(
        &self,
        transition: Transition,
        verb: &'static str,
    ) -> Result<ModeratedResource, ModerationServiceError> {
        if !transition.changed {
            return Ok(transition.resource);
        }

        let stored = self.repository.update(transition.resource)?;
        info!(
            resource_id = %stored.id,
            owner_id = %stored.owner_id,
            "resource {verb}"
        );

        if let Some(event) = transition.event {
            self.emit(event);
        }
        Ok(stored)
    }

    // Fire-and-forget: the persisted decision stands even if delivery fails.
    fn emit(&self, event: ModerationEvent) {
        let template = event.template();
        if let Err(err) = self.events.publish(event) {
            warn!(%err, template, "failed to publish moderation event");
        }
    }

    fn load(&self, id: &ResourceId) -> Result<ModeratedResource, ModerationServiceError> {
        let resource = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(resource)
    }

    fn load_live(&self, id: &ResourceId) -> Result<ModeratedResource, ModerationServiceError> {
        let resource = self.load(id)?;
        if resource.is_deleted() {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(resource)
    }
}

fn denied(operation: &'static str, subject: Option<&Subject>) -> ModerationServiceError {
    match subject {
        Some(subject) => {
            debug!(operation, subject_id = %subject.id, role = %subject.role, "access denied")
        }
        None => debug!(operation, "anonymous access denied"),
    }
    ModerationServiceError::Forbidden { operation }
}

/// Error raised by the moderation service.
#[derive(Debug, thiserror::Error)]
pub enum ModerationServiceError {
    #[error("{operation} is not permitted for this subject")]
    Forbidden { operation: &'static str },
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
