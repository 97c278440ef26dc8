//! `SeaORM` entity definitions.

pub mod budgets;
pub mod expense_claims;
pub mod locations;
pub mod notifications;
pub mod sea_orm_active_enums;
pub mod user_roles;
pub mod users;
