use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::resource::{OwnedResource, PublishedResource};
use super::role::Role;
use super::subject::Subject;

/// Standard action set checked for every resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    Restore,
    ForceDelete,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::ViewAny,
        Action::View,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Restore,
        Action::ForceDelete,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Action::ViewAny => "viewAny",
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Restore => "restore",
            Action::ForceDelete => "forceDelete",
        }
    }

    /// Whether the decision depends on a specific resource.
    pub const fn targets_instance(self) -> bool {
        !matches!(self, Action::ViewAny | Action::Create)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "viewany" => Ok(Action::ViewAny),
            "view" => Ok(Action::View),
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "restore" => Ok(Action::Restore),
            "forcedelete" => Ok(Action::ForceDelete),
            _ => Err(UnknownAction(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

/// Owner-or-admin override shared by every resource kind.
pub fn is_owner_or_admin<R>(subject: &Subject, resource: &R) -> bool
where
    R: OwnedResource + ?Sized,
{
    subject.is_admin() || &subject.id == resource.owner_id()
}

/// Instance-level yes/no decisions.
///
/// Every method is a pure function of its arguments. `None` stands for an
/// anonymous request, which may browse and view published content but can
/// never mutate anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationDecider;

impl AuthorizationDecider {
    pub fn new() -> Self {
        Self
    }

    pub fn view_any(&self, _subject: Option<&Subject>) -> bool {
        true
    }

    pub fn view<R>(&self, subject: Option<&Subject>, resource: &R) -> bool
    where
        R: PublishedResource + ?Sized,
    {
        if resource.is_active() {
            return true;
        }
        subject.is_some_and(|subject| is_owner_or_admin(subject, resource))
    }

    pub fn create(&self, subject: Option<&Subject>) -> bool {
        subject.is_some_and(|subject| matches!(subject.role, Role::Business | Role::Admin))
    }

    pub fn update<R>(&self, subject: Option<&Subject>, resource: &R) -> bool
    where
        R: OwnedResource + ?Sized,
    {
        subject.is_some_and(|subject| is_owner_or_admin(subject, resource))
    }

    pub fn delete<R>(&self, subject: Option<&Subject>, resource: &R) -> bool
    where
        R: OwnedResource + ?Sized,
    {
        subject.is_some_and(|subject| is_owner_or_admin(subject, resource))
    }

    /// Admin only. Owning the resource is not enough.
    pub fn restore<R>(&self, subject: Option<&Subject>, _resource: &R) -> bool
    where
        R: OwnedResource + ?Sized,
    {
        self.is_admin(subject)
    }

    /// Admin only. Owning the resource is not enough.
    pub fn force_delete<R>(&self, subject: Option<&Subject>, _resource: &R) -> bool
    where
        R: OwnedResource + ?Sized,
    {
        self.is_admin(subject)
    }

    /// Gate for approve, reject, and the review queue.
    pub fn moderate(&self, subject: Option<&Subject>) -> bool {
        self.is_admin(subject)
    }

    /// Dispatch on `action`. Instance-level actions without a resource are denied.
    pub fn decide<R>(&self, action: Action, subject: Option<&Subject>, resource: Option<&R>) -> bool
    where
        R: PublishedResource + ?Sized,
    {
        match (action, resource) {
            (Action::ViewAny, _) => self.view_any(subject),
            (Action::Create, _) => self.create(subject),
            (Action::View, Some(resource)) => self.view(subject, resource),
            (Action::Update, Some(resource)) => self.update(subject, resource),
            (Action::Delete, Some(resource)) => self.delete(subject, resource),
            (Action::Restore, Some(resource)) => self.restore(subject, resource),
            (Action::ForceDelete, Some(resource)) => self.force_delete(subject, resource),
            (_, None) => false,
        }
    }

    fn is_admin(&self, subject: Option<&Subject>) -> bool {
        subject.is_some_and(Subject::is_admin)
    }
}
