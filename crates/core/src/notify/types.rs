//! Notification types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use claimflow_shared::types::{ClaimId, LocationId, NotificationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::expense::{ExpenseClaim, ExpenseType};

/// An in-app notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// In-app link to the subject.
    pub link: Option<String>,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates unread notifications, one per recipient.
    pub fn for_recipients(
        recipients: &BTreeSet<UserId>,
        title: &str,
        message: &str,
        link: Option<&str>,
        at: DateTime<Utc>,
    ) -> Vec<Self> {
        recipients
            .iter()
            .map(|user_id| Self {
                id: NotificationId::new(),
                user_id: *user_id,
                title: title.to_string(),
                message: message.to_string(),
                link: link.map(str::to_string),
                is_read: false,
                created_at: at,
            })
            .collect()
    }
}

/// Who receives an event, as directory queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience {
    /// Each entry is `(location filter, roles)`; results are unioned.
    pub queries: Vec<(Option<LocationId>, Vec<Role>)>,
}

/// A committed transition worth telling people about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A claim was raised and awaits approval.
    ClaimSubmitted {
        /// Claim.
        claim_id: ClaimId,
        /// Claim location.
        location_id: LocationId,
        /// Expense type.
        expense_type: ExpenseType,
        /// Claimed amount.
        amount: Decimal,
    },
    /// A claim was approved and awaits payout.
    ClaimApproved {
        /// Claim.
        claim_id: ClaimId,
        /// Claim location.
        location_id: LocationId,
        /// Expense type.
        expense_type: ExpenseType,
        /// Claimed amount.
        amount: Decimal,
    },
}

impl NotificationEvent {
    /// Event for a newly created claim.
    #[must_use]
    pub fn submitted(claim: &ExpenseClaim) -> Self {
        Self::ClaimSubmitted {
            claim_id: claim.id,
            location_id: claim.location_id,
            expense_type: claim.expense_type,
            amount: claim.amount,
        }
    }

    /// Event for a newly approved claim.
    #[must_use]
    pub fn approved(claim: &ExpenseClaim) -> Self {
        Self::ClaimApproved {
            claim_id: claim.id,
            location_id: claim.location_id,
            expense_type: claim.expense_type,
            amount: claim.amount,
        }
    }

    /// Name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ClaimSubmitted { .. } => "claim_submitted",
            Self::ClaimApproved { .. } => "claim_approved",
        }
    }

    /// The claim the event is about.
    #[must_use]
    pub const fn claim_id(&self) -> ClaimId {
        match self {
            Self::ClaimSubmitted { claim_id, .. } | Self::ClaimApproved { claim_id, .. } => {
                *claim_id
            }
        }
    }

    /// Recipients of the event.
    ///
    /// Submissions go to admins of the location plus every super admin;
    /// approvals go to the location's cashiers.
    #[must_use]
    pub fn audience(&self) -> Audience {
        let queries = match self {
            Self::ClaimSubmitted { location_id, .. } => vec![
                (Some(*location_id), vec![Role::Admin, Role::SuperAdmin]),
                (None, vec![Role::SuperAdmin]),
            ],
            Self::ClaimApproved { location_id, .. } => {
                vec![(Some(*location_id), vec![Role::Cashier])]
            }
        };
        Audience { queries }
    }

    /// Title, message and link.
    #[must_use]
    pub fn render(&self) -> (String, String, String) {
        let link = format!("/expenses/{}", self.claim_id());
        match self {
            Self::ClaimSubmitted {
                expense_type,
                amount,
                ..
            } => (
                "Expense awaiting approval".to_string(),
                format!("A {expense_type} expense of {amount} is awaiting your approval."),
                link,
            ),
            Self::ClaimApproved {
                expense_type,
                amount,
                ..
            } => (
                "Expense ready for payout".to_string(),
                format!("A {expense_type} expense of {amount} has been approved and is ready for payout."),
                link,
            ),
        }
    }
}
