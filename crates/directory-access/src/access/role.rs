use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of subject classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Free,
    Business,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Free, Role::Business, Role::Admin];

    /// Stable identifier used in storage and on the command line.
    pub const fn key(self) -> &'static str {
        match self {
            Role::Free => "free",
            Role::Business => "business",
            Role::Admin => "admin",
        }
    }

    pub fn label(self) -> &'static str {
        RoleCapabilityTable::label(self)
    }

    pub fn permissions(self) -> &'static [Permission] {
        RoleCapabilityTable::permissions(self)
    }

    pub fn has_permission(self, permission: Permission) -> bool {
        RoleCapabilityTable::has_permission(self, permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Role::Free),
            "business" => Ok(Role::Business),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

/// Role value outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

/// Named capability granted wholesale to a role.
///
/// Permissions are advisory for menus and navigation. Instance-level checks
/// go through [`AuthorizationDecider`](super::AuthorizationDecider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewListings,
    CreateEnquiry,
    WriteReview,
    BookmarkContent,
    ApplyJob,
    RedeemCoupon,
    CreateListing,
    EditListing,
    CreateEvent,
    CreateJob,
    CreateProduct,
    CreateCoupon,
    ManageBookings,
    ViewAnalytics,
    ManageUsers,
    ManageListings,
    ManageCategories,
    ManageLocations,
    ManageSettings,
    ViewAllAnalytics,
    ApproveContent,
    ManagePayments,
}

impl Permission {
    pub const ALL: [Permission; 22] = [
        Permission::ViewListings,
        Permission::CreateEnquiry,
        Permission::WriteReview,
        Permission::BookmarkContent,
        Permission::ApplyJob,
        Permission::RedeemCoupon,
        Permission::CreateListing,
        Permission::EditListing,
        Permission::CreateEvent,
        Permission::CreateJob,
        Permission::CreateProduct,
        Permission::CreateCoupon,
        Permission::ManageBookings,
        Permission::ViewAnalytics,
        Permission::ManageUsers,
        Permission::ManageListings,
        Permission::ManageCategories,
        Permission::ManageLocations,
        Permission::ManageSettings,
        Permission::ViewAllAnalytics,
        Permission::ApproveContent,
        Permission::ManagePayments,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::ViewListings => "view_listings",
            Permission::CreateEnquiry => "create_enquiry",
            Permission::WriteReview => "write_review",
            Permission::BookmarkContent => "bookmark_content",
            Permission::ApplyJob => "apply_job",
            Permission::RedeemCoupon => "redeem_coupon",
            Permission::CreateListing => "create_listing",
            Permission::EditListing => "edit_listing",
            Permission::CreateEvent => "create_event",
            Permission::CreateJob => "create_job",
            Permission::CreateProduct => "create_product",
            Permission::CreateCoupon => "create_coupon",
            Permission::ManageBookings => "manage_bookings",
            Permission::ViewAnalytics => "view_analytics",
            Permission::ManageUsers => "manage_users",
            Permission::ManageListings => "manage_listings",
            Permission::ManageCategories => "manage_categories",
            Permission::ManageLocations => "manage_locations",
            Permission::ManageSettings => "manage_settings",
            Permission::ViewAllAnalytics => "view_all_analytics",
            Permission::ApproveContent => "approve_content",
            Permission::ManagePayments => "manage_payments",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Permission::ALL
            .iter()
            .copied()
            .find(|permission| permission.as_str() == needle)
            .ok_or_else(|| UnknownPermission(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission '{0}'")]
pub struct UnknownPermission(pub String);

/// One row of the capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCapabilities {
    pub role: Role,
    pub label: &'static str,
    pub permissions: &'static [Permission],
}

const FREE_PERMISSIONS: &[Permission] = &[
    Permission::ViewListings,
    Permission::CreateEnquiry,
    Permission::WriteReview,
    Permission::BookmarkContent,
    Permission::ApplyJob,
    Permission::RedeemCoupon,
];

const BUSINESS_PERMISSIONS: &[Permission] = &[
    Permission::ViewListings,
    Permission::CreateListing,
    Permission::EditListing,
    Permission::CreateEvent,
    Permission::CreateJob,
    Permission::CreateProduct,
    Permission::CreateCoupon,
    Permission::ManageBookings,
    Permission::ViewAnalytics,
];

// Admin is not a superset of the other roles.
const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ManageUsers,
    Permission::ManageListings,
    Permission::ManageCategories,
    Permission::ManageLocations,
    Permission::ManageSettings,
    Permission::ViewAllAnalytics,
    Permission::ApproveContent,
    Permission::ManagePayments,
];

static CAPABILITY_TABLE: [RoleCapabilities; 3] = [
    RoleCapabilities {
        role: Role::Free,
        label: "Free User",
        permissions: FREE_PERMISSIONS,
    },
    RoleCapabilities {
        role: Role::Business,
        label: "Business Owner",
        permissions: BUSINESS_PERMISSIONS,
    },
    RoleCapabilities {
        role: Role::Admin,
        label: "Administrator",
        permissions: ADMIN_PERMISSIONS,
    },
];

/// Immutable role to capability mapping used for role-level gating.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleCapabilityTable;

impl RoleCapabilityTable {
    pub fn entries() -> &'static [RoleCapabilities] {
        &CAPABILITY_TABLE
    }

    pub fn entry(role: Role) -> &'static RoleCapabilities {
        match role {
            Role::Free => &CAPABILITY_TABLE[0],
            Role::Business => &CAPABILITY_TABLE[1],
            Role::Admin => &CAPABILITY_TABLE[2],
        }
    }

    pub fn label(role: Role) -> &'static str {
        Self::entry(role).label
    }

    pub fn permissions(role: Role) -> &'static [Permission] {
        Self::entry(role).permissions
    }

    /// Permission identifiers for the UI/menu layer.
    pub fn permission_names(role: Role) -> BTreeSet<&'static str> {
        Self::permissions(role)
            .iter()
            .map(|permission| permission.as_str())
            .collect()
    }

    pub fn has_permission(role: Role, permission: Permission) -> bool {
        Self::permissions(role).contains(&permission)
    }

    /// String form of [`has_permission`](Self::has_permission); unrecognised names are never granted.
    pub fn has_permission_named(role: Role, permission: &str) -> bool {
        permission
            .parse::<Permission>()
            .map(|permission| Self::has_permission(role, permission))
            .unwrap_or(false)
    }
}
