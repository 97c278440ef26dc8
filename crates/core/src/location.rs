//! Locations (tenant boundaries).

use chrono::{DateTime, Utc};
use claimflow_shared::types::LocationId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A physical site scoping budgets, claims and most role checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location ID.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// City.
    pub city: String,
    /// Optional hard cap on monthly petty cash, independent of budgets.
    pub monthly_petty_cash_limit: Option<Decimal>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
