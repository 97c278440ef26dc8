//! Repository implementations of the engine's store traits.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod budget;
pub mod claim;
pub mod location;
pub mod notification;
pub mod user;


pub use budget::BudgetRepository;
pub use claim::ClaimRepository;
pub use location::LocationRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;

use chrono::{DateTime, FixedOffset, Utc};
use claimflow_core::store::StoreError;
use sea_orm::DbErr;

/// Maps a driver error onto the store taxonomy.
pub(crate) fn backend(err: DbErr) -> StoreError {
    StoreError::Backend(err.to_string())
}

pub(crate) fn to_utc(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

pub(crate) fn to_db_time(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.into()
}

pub(crate) fn to_db_int(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Backend(format!("{value} out of range")))
}

pub(crate) fn from_db_int(value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Backend(format!("{value} out of range")))
}
