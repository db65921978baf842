use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subject::UserId;
use crate::moderation::ModerationStatus;

/// Identifier wrapper for directory content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every kind of owned content the directory publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Listing,
    Event,
    Job,
    Product,
    Coupon,
    ServiceExpert,
    NewsArticle,
}

impl ResourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            ResourceKind::Listing => "listing",
            ResourceKind::Event => "event",
            ResourceKind::Job => "job",
            ResourceKind::Product => "product",
            ResourceKind::Coupon => "coupon",
            ResourceKind::ServiceExpert => "service_expert",
            ResourceKind::NewsArticle => "news_article",
        }
    }

    /// Kinds with an editorial review step. The rest publish on creation.
    pub const fn requires_review(self) -> bool {
        matches!(
            self,
            ResourceKind::Listing | ResourceKind::ServiceExpert | ResourceKind::NewsArticle
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Anything with a single, immutable owner.
pub trait OwnedResource {
    fn owner_id(&self) -> &UserId;
}

/// Owned content that can be hidden from the public.
pub trait PublishedResource: OwnedResource {
    fn is_active(&self) -> bool;
}

pub const TITLE_FIELD: &str = "title";
pub const BODY_FIELD: &str = "body";
pub const DISPLAY_ORDER_FIELD: &str = "display_order";

/// Editable payload shared by every resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContent {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub display_order: i32,
}

impl ResourceContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            display_order: 0,
        }
    }

    /// Names of the fields that differ between `self` and `updated`.
    pub fn changed_fields(&self, updated: &ResourceContent) -> BTreeSet<String> {
        let mut changed = BTreeSet::new();
        if self.title != updated.title {
            changed.insert(TITLE_FIELD.to_string());
        }
        if self.body != updated.body {
            changed.insert(BODY_FIELD.to_string());
        }
        if self.display_order != updated.display_order {
            changed.insert(DISPLAY_ORDER_FIELD.to_string());
        }
        changed
    }
}

/// Owned, reviewable directory entry (listing, expert profile, article, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeratedResource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub owner_id: UserId,
    pub is_active: bool,
    /// `None` for kinds that use plain activation instead of review.
    pub moderation_status: Option<ModerationStatus>,
    pub content: ResourceContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: u64,
}

impl ModeratedResource {
    /// Unsubmitted resource; run it through `ModerationStateMachine::submit` before storing.
    pub fn draft(
        id: ResourceId,
        kind: ResourceKind,
        owner_id: UserId,
        content: ResourceContent,
    ) -> Self {
        Self {
            id,
            kind,
            owner_id,
            is_active: false,
            moderation_status: None,
            content,
            rejection_reason: None,
            deleted_at: None,
            version: 0,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn status_label(&self) -> &'static str {
        match self.moderation_status {
            Some(status) => status.label(),
            None if self.is_active => "active",
            None => "inactive",
        }
    }
}

impl OwnedResource for ModeratedResource {
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}

impl PublishedResource for ModeratedResource {
    fn is_active(&self) -> bool {
        self.is_active
    }
}
