use std::sync::Arc;

use super::common::*;
use crate::access::{ResourceContent, ResourceId, ResourceKind, UserId};
use crate::moderation::repository::{RepositoryError, ResourceRepository};
use crate::moderation::{
    InvalidTransition, ModerationEvent, ModerationPolicy, ModerationService,
    ModerationServiceError, ModerationStatus,
};

#[test]
fn owner_creates_pending_listing_and_admin_approves() {
    let (service, repository, events) = build_service();

    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("business owner can create");
    assert_eq!(created.moderation_status, Some(ModerationStatus::Pending));
    assert!(!created.is_active);
    assert_eq!(created.owner_id, UserId::new("7"));
    assert!(created.id.0.starts_with("res-"));

    let approved = service
        .approve(Some(&admin()), &created.id)
        .expect("admin can approve");
    assert_eq!(approved.moderation_status, Some(ModerationStatus::Approved));
    assert!(approved.is_active);

    let stored = repository
        .fetch(&created.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.moderation_status, Some(ModerationStatus::Approved));
    assert_eq!(
        events.events(),
        vec![ModerationEvent::ContentApproved {
            resource_id: created.id.clone(),
            owner_id: UserId::new("7"),
        }]
    );
}

#[test]
fn approving_twice_emits_single_event() {
    let (service, _, events) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");

    service.approve(Some(&admin()), &created.id).expect("first approve");
    let again = service
        .approve(Some(&admin()), &created.id)
        .expect("second approve");

    assert_eq!(again.moderation_status, Some(ModerationStatus::Approved));
    assert_eq!(events.events().len(), 1);
}

#[test]
fn reject_with_blank_reason_leaves_status_untouched() {
    let (service, repository, events) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");

    match service.reject(Some(&admin()), &created.id, "  ") {
        Err(ModerationServiceError::Transition(InvalidTransition::MissingReason)) => {}
        other => panic!("expected missing reason, got {other:?}"),
    }

    let stored = repository
        .fetch(&created.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.moderation_status, Some(ModerationStatus::Pending));
    assert!(events.events().is_empty());
}

#[test]
fn reject_notifies_owner_with_reason() {
    let (service, _, events) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");

    let rejected = service
        .reject(Some(&admin()), &created.id, "Inappropriate content")
        .expect("admin can reject");
    assert_eq!(rejected.moderation_status, Some(ModerationStatus::Rejected));

    match events.events().as_slice() {
        [ModerationEvent::ContentRejected {
            owner_id, reason, ..
        }] => {
            assert_eq!(owner_id, &UserId::new("7"));
            assert_eq!(reason, "Inappropriate content");
        }
        other => panic!("expected one rejection event, got {other:?}"),
    }
}

#[test]
fn non_admins_cannot_moderate() {
    let (service, _, events) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");

    for subject in [Some(owner()), Some(other_business()), Some(free_user()), None] {
        assert!(matches!(
            service.approve(subject.as_ref(), &created.id),
            Err(ModerationServiceError::Forbidden {
                operation: "approve"
            })
        ));
        assert!(matches!(
            service.reject(subject.as_ref(), &created.id, "Spam"),
            Err(ModerationServiceError::Forbidden { operation: "reject" })
        ));
    }
    assert!(events.events().is_empty());
}

#[test]
fn free_users_and_anonymous_cannot_create() {
    let (service, repository, _) = build_service();

    for subject in [Some(free_user()), None] {
        assert!(matches!(
            service.create(subject.as_ref(), ResourceKind::Listing, content()),
            Err(ModerationServiceError::Forbidden { operation: "create" })
        ));
    }
    assert!(repository.records.lock().expect("lock").by_id.is_empty());
}

#[test]
fn title_edit_on_approved_listing_requires_review() {
    let (service, _, _) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");
    service.approve(Some(&admin()), &created.id).expect("approve");

    let mut reordered = content();
    reordered.display_order = 3;
    let still_live = service
        .update_content(Some(&owner()), &created.id, reordered.clone())
        .expect("owner can reorder");
    assert_eq!(still_live.moderation_status, Some(ModerationStatus::Approved));
    assert_eq!(still_live.content.display_order, 3);

    let retitled = ResourceContent {
        title: "Harbor Street Bakery & Cafe".to_string(),
        ..reordered
    };
    let resubmitted = service
        .update_content(Some(&owner()), &created.id, retitled)
        .expect("owner can retitle");
    assert_eq!(resubmitted.moderation_status, Some(ModerationStatus::Pending));
    assert!(!resubmitted.is_active);
    assert_eq!(resubmitted.content.title, "Harbor Street Bakery & Cafe");
}

#[test]
fn peers_cannot_edit_or_delete_each_others_content() {
    let (service, _, _) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");

    let edit = ResourceContent::new("Hijacked", "Spam");
    for subject in [other_business(), free_user()] {
        assert!(matches!(
            service.update_content(Some(&subject), &created.id, edit.clone()),
            Err(ModerationServiceError::Forbidden { operation: "update" })
        ));
        assert!(matches!(
            service.delete(Some(&subject), &created.id),
            Err(ModerationServiceError::Forbidden { operation: "delete" })
        ));
    }

    let edited = service
        .update_content(Some(&admin()), &created.id, edit)
        .expect("admin can edit anything");
    assert_eq!(edited.content.title, "Hijacked");
}

#[test]
fn pending_content_is_hidden_from_the_public() {
    let (service, _, _) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");

    assert!(service.get(Some(&owner()), &created.id).is_ok());
    assert!(service.get(Some(&admin()), &created.id).is_ok());
    assert!(matches!(
        service.get(Some(&other_business()), &created.id),
        Err(ModerationServiceError::Forbidden { operation: "view" })
    ));
    assert!(matches!(
        service.get(None, &created.id),
        Err(ModerationServiceError::Forbidden { operation: "view" })
    ));

    service.approve(Some(&admin()), &created.id).expect("approve");
    assert!(service.get(None, &created.id).is_ok());
}

#[test]
fn owner_soft_deletes_but_only_admin_restores_or_purges() {
    let (service, repository, _) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Event, content())
        .expect("create");
    assert!(created.is_active);

    let deleted = service
        .delete(Some(&owner()), &created.id)
        .expect("owner can delete");
    assert!(deleted.is_deleted());
    assert!(matches!(
        service.get(Some(&owner()), &created.id),
        Err(ModerationServiceError::Repository(RepositoryError::NotFound))
    ));
    assert!(service.get(Some(&admin()), &created.id).is_ok());

    assert!(matches!(
        service.restore(Some(&owner()), &created.id),
        Err(ModerationServiceError::Forbidden {
            operation: "restore"
        })
    ));
    assert!(matches!(
        service.force_delete(Some(&owner()), &created.id),
        Err(ModerationServiceError::Forbidden {
            operation: "forceDelete"
        })
    ));

    let restored = service
        .restore(Some(&admin()), &created.id)
        .expect("admin can restore");
    assert!(!restored.is_deleted());

    service
        .force_delete(Some(&admin()), &created.id)
        .expect("admin can purge");
    assert!(repository.fetch(&created.id).expect("fetch").is_none());
}

#[test]
fn review_queue_lists_pending_for_admins_only() {
    let (service, _, _) = build_service();
    let first = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create listing");
    let second = service
        .create(Some(&owner()), ResourceKind::NewsArticle, content())
        .expect("create article");
    service
        .create(Some(&owner()), ResourceKind::Product, content())
        .expect("create product");
    service.approve(Some(&admin()), &second.id).expect("approve");

    let queue = service
        .review_queue(Some(&admin()), 10)
        .expect("admin sees queue");
    let ids: Vec<&ResourceId> = queue.iter().map(|resource| &resource.id).collect();
    assert_eq!(ids, vec![&first.id]);

    assert!(matches!(
        service.review_queue(Some(&owner()), 10),
        Err(ModerationServiceError::Forbidden { operation: "review" })
    ));
}

#[test]
fn rejected_edit_reopens_review_when_policy_allows() {
    let (service, _, _) = build_service_with(ModerationPolicy {
        reopen_rejected_on_edit: true,
        ..ModerationPolicy::default()
    });
    let created = service
        .create(Some(&owner()), ResourceKind::ServiceExpert, content())
        .expect("create");
    service
        .reject(Some(&admin()), &created.id, "Missing credentials")
        .expect("reject");

    let fixed = ResourceContent::new("Licensed electrician", "License #4471 on file.");
    let reopened = service
        .update_content(Some(&owner()), &created.id, fixed)
        .expect("owner edits");
    assert_eq!(reopened.moderation_status, Some(ModerationStatus::Pending));
    assert_eq!(reopened.rejection_reason, None);
}

#[test]
fn publish_failures_do_not_undo_decisions() {
    let repository = Arc::new(MemoryRepository::default());
    let service = ModerationService::new(
        repository.clone(),
        Arc::new(OfflineEvents),
        ModerationPolicy::default(),
    );
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");

    let approved = service
        .approve(Some(&admin()), &created.id)
        .expect("approval stands without delivery");
    assert_eq!(approved.moderation_status, Some(ModerationStatus::Approved));
}

#[test]
fn stale_writes_are_rejected() {
    let (service, repository, _) = build_service();
    let created = service
        .create(Some(&owner()), ResourceKind::Listing, content())
        .expect("create");

    service.approve(Some(&admin()), &created.id).expect("approve");

    let mut stale = created.clone();
    stale.moderation_status = Some(ModerationStatus::Rejected);
    match repository.update(stale) {
        Err(RepositoryError::StaleVersion { expected, found }) => {
            assert_eq!(expected, created.version);
            assert_eq!(found, created.version + 1);
        }
        other => panic!("expected stale version, got {other:?}"),
    }
}

#[test]
fn repository_outages_propagate() {
    let service = ModerationService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryEvents::default()),
        ModerationPolicy::default(),
    );

    match service.create(Some(&owner()), ResourceKind::Listing, content()) {
        Err(ModerationServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable repository, got {other:?}"),
    }
    match service.approve(Some(&admin()), &ResourceId("res-404".to_string())) {
        Err(ModerationServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable repository, got {other:?}"),
    }
}

#[test]
fn missing_resources_are_not_found() {
    let (service, _, _) = build_service();
    match service.get(Some(&admin()), &ResourceId("res-missing".to_string())) {
        Err(ModerationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn service_runs_the_policy_it_was_built_with() {
    let policy = ModerationPolicy {
        reopen_rejected_on_edit: true,
        publish_on_approve: false,
        ..ModerationPolicy::default()
    };
    let (service, _, _) = build_service_with(policy.clone());
    assert_eq!(service.machine().policy(), &policy);
}
