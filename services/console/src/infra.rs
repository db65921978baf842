use directory_access::access::{ModeratedResource, ResourceId};
use directory_access::moderation::{
    ModerationEvent, ModerationStatus, Notification, RepositoryError, ResourceRepository,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Default)]
struct Records {
    by_id: HashMap<ResourceId, ModeratedResource>,
    arrival: Vec<ResourceId>,
}

/// Version-checked in-memory store; writers race on `version`.
#[derive(Default, Clone)]
pub(crate) struct InMemoryResourceRepository {
    records: Arc<Mutex<Records>>,
}

impl ResourceRepository for InMemoryResourceRepository {
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
        let Some(stored) = guard.by_id.get(&resource.id) else {
            return Err(RepositoryError::NotFound);
        };
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
        match guard.by_id.remove(id) {
            Some(_) => {
                guard.arrival.retain(|arrived| arrived != id);
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    // Insertion order; ids are not guaranteed to sort chronologically.
    fn pending(&self, limit: usize) -> Result<Vec<ModeratedResource>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .arrival
            .iter()
            .filter_map(|id| guard.by_id.get(id))
            .filter(|record| {
                !record.is_deleted() && record.moderation_status == Some(ModerationStatus::Pending)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Drain moderation events into owner notifications until every publisher is dropped.
pub(crate) fn spawn_notification_inbox(
    mut receiver: UnboundedReceiver<ModerationEvent>,
) -> JoinHandle<Vec<Notification>> {
    tokio::spawn(async move {
        let mut delivered = Vec::new();
        while let Some(event) = receiver.recv().await {
            let notice = event.notification();
            info!(
                recipient = %notice.recipient,
                template = %notice.template,
                "notification queued"
            );
            delivered.push(notice);
        }
        delivered
    })
}
