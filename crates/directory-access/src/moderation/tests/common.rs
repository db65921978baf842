use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::access::{
    ModeratedResource, ResourceContent, ResourceId, ResourceKind, Role, Subject, UserId,
};
use crate::moderation::events::{EventPublisher, ModerationEvent, PublishError};
use crate::moderation::machine::{ModerationPolicy, ModerationStateMachine};
use crate::moderation::repository::{RepositoryError, ResourceRepository};
use crate::moderation::service::ModerationService;
use crate::moderation::ModerationStatus;

pub(super) fn owner() -> Subject {
    Subject::new("7", Role::Business)
}

pub(super) fn other_business() -> Subject {
    Subject::new("8", Role::Business)
}

pub(super) fn free_user() -> Subject {
    Subject::new("9", Role::Free)
}

pub(super) fn admin() -> Subject {
    Subject::new("1", Role::Admin)
}

pub(super) fn content() -> ResourceContent {
    ResourceContent::new(
        "Harbor Street Bakery",
        "Sourdough, pastries, and custom cakes baked daily.",
    )
}

pub(super) fn listing_with(status: ModerationStatus) -> ModeratedResource {
    let mut resource = ModeratedResource::draft(
        ResourceId("res-test".to_string()),
        ResourceKind::Listing,
        UserId::new("7"),
        content(),
    );
    resource.moderation_status = Some(status);
    resource.is_active = status == ModerationStatus::Approved;
    resource
}

pub(super) fn machine() -> ModerationStateMachine {
    ModerationStateMachine::new(ModerationPolicy::default())
}

pub(super) fn build_service() -> (
    ModerationService<MemoryRepository, MemoryEvents>,
    Arc<MemoryRepository>,
    Arc<MemoryEvents>,
) {
    build_service_with(ModerationPolicy::default())
}

pub(super) fn build_service_with(
    policy: ModerationPolicy,
) -> (
    ModerationService<MemoryRepository, MemoryEvents>,
    Arc<MemoryRepository>,
    Arc<MemoryEvents>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let events = Arc::new(MemoryEvents::default());
    let service = ModerationService::new(repository.clone(), events.clone(), policy);
    (service, repository, events)
}

#[derive(Default)]
pub(super) struct Records {
    pub(super) by_id: HashMap<ResourceId, ModeratedResource>,
    arrival: Vec<ResourceId>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Records>>,
}

impl ResourceRepository for MemoryRepository {
    fn insert(&self, resource: ModeratedResource) -> Result<ModeratedResource, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.by_id.contains_key(&resource.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.arrival.push(resource.id.clone());
        guard.by_id.insert(resource.id.clone(), resource.clone());
        Ok(resource)
    }

    fn update(&self, mut resource: ModeratedResource) -> Result<ModeratedResource, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.by_id.get(&resource.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != resource.version {
            return Err(RepositoryError::StaleVersion {
                expected: resource.version,
                found: stored.version,
            });
        }
        resource.version += 1;
        guard.by_id.insert(resource.id.clone(), resource.clone());
        Ok(resource)
    }

    fn fetch(&self, id: &ResourceId) -> Result<Option<ModeratedResource>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.by_id.get(id).cloned())
    }

    fn remove(&self, id: &ResourceId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.by_id.remove(id).ok_or(RepositoryError::NotFound)?;
        guard.arrival.retain(|arrived| arrived != id);
        Ok(())
    }

    fn pending(&self, limit: usize) -> Result<Vec<ModeratedResource>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .arrival
            .iter()
            .filter_map(|id| guard.by_id.get(id))
            .filter(|resource| {
                !resource.is_deleted()
                    && resource.moderation_status == Some(ModerationStatus::Pending)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryEvents {
    events: Arc<Mutex<Vec<ModerationEvent>>>,
}

impl MemoryEvents {
    pub(super) fn events(&self) -> Vec<ModerationEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl EventPublisher for MemoryEvents {
    fn publish(&self, event: ModerationEvent) -> Result<(), PublishError> {
        self.events.lock().expect("event mutex poisoned").push(event);
        Ok(())
    }
}

pub(super) struct OfflineEvents;

impl EventPublisher for OfflineEvents {
    fn publish(&self, _event: ModerationEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("mailer offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl ResourceRepository for UnavailableRepository {
    fn insert(&self, _resource: ModeratedResource) -> Result<ModeratedResource, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _resource: ModeratedResource) -> Result<ModeratedResource, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ResourceId) -> Result<Option<ModeratedResource>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &ResourceId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ModeratedResource>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
