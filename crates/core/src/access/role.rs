//! Actor roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A role an actor may hold. Actors can hold several roles at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Cross-location administrator.
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    /// Location administrator; approves claims and budgets.
    #[serde(rename = "Admin")]
    Admin,
    /// Raises expense claims and submits budgets.
    #[serde(rename = "Business Manager")]
    BusinessManager,
    /// Pays out cheque/transfer claims.
    #[serde(rename = "Accountant")]
    Accountant,
    /// Pays out cash claims.
    #[serde(rename = "Cashier")]
    Cashier,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::SuperAdmin,
        Self::Admin,
        Self::BusinessManager,
        Self::Accountant,
        Self::Cashier,
    ];

    /// Returns the display name stored in the directory.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::BusinessManager => "Business Manager",
            Self::Accountant => "Accountant",
            Self::Cashier => "Cashier",
        }
    }

    /// Returns true for Admin and Super Admin.
    #[must_use]
    pub const fn is_admin_tier(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
