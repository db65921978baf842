//! Role capabilities and instance-level authorization decisions.

pub mod policy;
pub mod resource;
pub mod role;
pub mod subject;

pub use policy::{is_owner_or_admin, Action, AuthorizationDecider, UnknownAction};
pub use resource::{
    ModeratedResource, OwnedResource, PublishedResource, ResourceContent, ResourceId,
    ResourceKind,
};
pub use role::{
    Permission, Role, RoleCapabilities, RoleCapabilityTable, UnknownPermission, UnknownRole,
};
pub use subject::{Subject, User, UserId};
