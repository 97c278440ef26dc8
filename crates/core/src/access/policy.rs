//! Authorization matrix.
//!
//! Every engine operation consults exactly one of these functions before it
//! touches state. Denials are logged with the internal rule name and
//! surfaced as a bare [`AccessError::Forbidden`].

use claimflow_shared::types::LocationId;
use tracing::warn;

use super::context::ActorContext;
use super::error::AccessError;
use super::role::Role;
use crate::expense::DisburseType;

fn ensure(allowed: bool, ctx: &ActorContext, rule: &'static str) -> Result<(), AccessError> {
    if allowed {
        Ok(())
    } else {
        warn!(actor_id = %ctx.actor_id(), location_id = %ctx.location_id(), rule, "Access denied");
        Err(AccessError::Forbidden)
    }
}

/// Only Business Managers raise expense claims.
pub fn authorize_claim_creation(ctx: &ActorContext) -> Result<(), AccessError> {
    ensure(
        ctx.has_role(Role::BusinessManager),
        ctx,
        "claim_create_requires_business_manager",
    )
}

/// Approve and reject require an Admin-tier actor.
pub fn authorize_claim_decision(ctx: &ActorContext) -> Result<(), AccessError> {
    ensure(ctx.is_admin_tier(), ctx, "claim_decision_requires_admin_tier")
}

/// Location scope for reads and admin decisions: own location, or any
/// location for a Super Admin.
pub fn authorize_location_scope(
    ctx: &ActorContext,
    location_id: LocationId,
) -> Result<(), AccessError> {
    ensure(
        ctx.can_reach_location(location_id),
        ctx,
        "location_scope_mismatch",
    )
}

/// Disbursement follows the claim's current rail and has no Super Admin
/// override: Cashiers pay cash, Accountants pay cheques and transfers, both
/// only at their own location.
pub fn authorize_disbursement(
    ctx: &ActorContext,
    disburse_type: DisburseType,
    location_id: LocationId,
) -> Result<(), AccessError> {
    ensure(
        ctx.has_role(disburse_type.disbursing_role()),
        ctx,
        "disburse_requires_rail_role",
    )?;
    ensure(
        ctx.is_home_location(location_id),
        ctx,
        "disburse_requires_home_location",
    )
}

/// Gate for payout operations before the claim is loaded: the actor must
/// hold at least one disbursing role.
pub fn authorize_payout_staff(ctx: &ActorContext) -> Result<(), AccessError> {
    ensure(
        ctx.has_role(Role::Cashier) || ctx.has_role(Role::Accountant),
        ctx,
        "payout_requires_cashier_or_accountant",
    )
}

/// Rail reassignment: an Accountant hands a claim over to cash, a Cashier
/// hands it over to cheque/transfer.
pub fn authorize_disburse_type_change(
    ctx: &ActorContext,
    new_type: DisburseType,
    location_id: LocationId,
) -> Result<(), AccessError> {
    let required = match new_type {
        DisburseType::Cash => Role::Accountant,
        DisburseType::ChequeOrTransfer => Role::Cashier,
    };
    ensure(ctx.has_role(required), ctx, "reassign_requires_handing_over_role")?;
    ensure(
        ctx.is_home_location(location_id),
        ctx,
        "reassign_requires_home_location",
    )
}

/// Budgets are submitted by Business Managers or Admin-tier actors.
pub fn authorize_budget_submission(ctx: &ActorContext) -> Result<(), AccessError> {
    ensure(
        ctx.has_role(Role::BusinessManager) || ctx.is_admin_tier(),
        ctx,
        "budget_submit_requires_manager_or_admin",
    )
}

/// Approving or rejecting a budget requires an Admin-tier actor.
pub fn authorize_budget_decision(ctx: &ActorContext) -> Result<(), AccessError> {
    ensure(ctx.is_admin_tier(), ctx, "budget_decision_requires_admin_tier")
}

/// Remaining-budget queries: own location for everyone, any location for
/// Super Admins and Accountants.
pub fn authorize_budget_query(
    ctx: &ActorContext,
    location_id: LocationId,
) -> Result<(), AccessError> {
    ensure(
        ctx.is_home_location(location_id)
            || ctx.is_super_admin()
            || ctx.has_role(Role::Accountant),
        ctx,
        "budget_query_scope_mismatch",
    )
}

/// Location settings are edited by Admin-tier actors within their scope.
pub fn authorize_location_admin(
    ctx: &ActorContext,
    location_id: LocationId,
) -> Result<(), AccessError> {
    ensure(ctx.is_admin_tier(), ctx, "location_admin_requires_admin_tier")?;
    authorize_location_scope(ctx, location_id)
}

/// Location filter for list queries.
///
/// Super Admins may name any location or none (all locations); everyone
/// else is pinned to their home location and may only name it.
pub fn resolve_list_scope(
    ctx: &ActorContext,
    requested: Option<LocationId>,
) -> Result<Option<LocationId>, AccessError> {
    if ctx.is_super_admin() {
        return Ok(requested);
    }
    match requested {
        Some(location_id) => {
            ensure(ctx.is_home_location(location_id), ctx, "list_scope_mismatch")?;
            Ok(Some(location_id))
        }
        None => Ok(Some(ctx.location_id())),
    }
}
