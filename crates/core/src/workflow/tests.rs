//! Orchestrator scenarios against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use claimflow_shared::types::{BudgetId, ClaimId, LocationId, NotificationId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value, json};

use super::error::{ErrorKind, WorkflowError};
use super::service::{ClaimQuery, Workflow};
use crate::access::{ActorContext, Role};
use crate::budget::{BudgetError, BudgetStatus};
use crate::expense::{
    DisburseType, ExpenseClaim, ExpenseError, ExpenseStatus, ExpenseType, NewClaimInput,
    PaymentDetails,
};
use crate::location::Location;
use crate::memory::MemoryStore;
use crate::notify::NotificationDispatcher;
use crate::store::{ActorRecord, ClaimStore, NotificationStore, Stores};

struct Harness {
    store: Arc<MemoryStore>,
    workflow: Workflow,
    location: LocationId,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::from_backend(store.clone());
        let dispatcher = NotificationDispatcher::new(
            stores.notifications.clone(),
            stores.directory.clone(),
            Duration::from_secs(2),
        );
        let workflow = Workflow::new(stores, dispatcher, chrono_tz::UTC);
        let location = LocationId::new();
        store.add_location(Location {
            id: location,
            name: "Head Office".to_string(),
            city: "Lahore".to_string(),
            monthly_petty_cash_limit: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Self {
            store,
            workflow,
            location,
        }
    }

    fn actor(&self, location: LocationId, roles: &[Role]) -> ActorContext {
        let id = UserId::new();
        self.store.add_actor(ActorRecord {
            id,
            location_id: location,
            roles: roles.to_vec(),
            is_active: true,
        });
        ActorContext::new(id, location, roles.iter().copied())
    }

    fn at_home(&self, roles: &[Role]) -> ActorContext {
        self.actor(self.location, roles)
    }

    async fn approved_budget(&self, categories: Value) {
        let admin = self.at_home(&[Role::Admin]);
        let budget = self
            .workflow
            .submit_budget(&admin, &as_map(&categories))
            .await
            .unwrap();
        assert_eq!(budget.status, BudgetStatus::Approved);
    }

    async fn standard_budget(&self) {
        self.approved_budget(json!({ "FUEL": 40000, "UTILITIES": 60000 }))
            .await;
    }

    async fn claim(
        &self,
        manager: &ActorContext,
        amount: Decimal,
        disburse_type: DisburseType,
    ) -> Result<ExpenseClaim, WorkflowError> {
        self.workflow
            .create_claim(manager, fuel(amount, disburse_type))
            .await
    }
}

fn as_map(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn fuel(amount: Decimal, disburse_type: DisburseType) -> NewClaimInput {
    NewClaimInput {
        expense_type: ExpenseType::Fuel,
        amount,
        details: "Delivery van diesel".to_string(),
        disburse_type,
        route_id: Some("R-1".to_string()),
        vehicle_id: Some("LEA-1234".to_string()),
        attachments: vec!["uploads/receipt-1.jpg".to_string()],
    }
}

fn full_payment(amount: Decimal) -> PaymentDetails {
    PaymentDetails {
        account_title: Some("Shell Pakistan".to_string()),
        account_no: Some("PK36SCBL0000001123456702".to_string()),
        bank_name: Some("Standard Chartered".to_string()),
        cheque_date: NaiveDate::from_ymd_opt(2026, 3, 10),
        disbursed_amount: Some(amount),
    }
}

#[tokio::test]
async fn test_aggregate_budget_gates_claim_creation() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);

    h.claim(&manager, dec!(35000), DisburseType::Cash)
        .await
        .unwrap();
    let summary = h
        .workflow
        .remaining_budget(&manager, None, None, None)
        .await
        .unwrap();
    assert_eq!(summary.spent_this_month, dec!(35000));
    assert_eq!(summary.categories.get("FUEL"), Some(&dec!(40000)));

    // Over the FUEL figure but within the aggregate.
    h.claim(&manager, dec!(10000), DisburseType::Cash)
        .await
        .unwrap();
    let summary = h
        .workflow
        .remaining_budget(&manager, None, None, None)
        .await
        .unwrap();
    assert_eq!(summary.spent_this_month, dec!(45000));
    assert_eq!(summary.remaining, dec!(55000));
    assert_eq!(summary.spent_by_category.get("FUEL"), Some(&dec!(45000)));

    let err = h
        .claim(&manager, dec!(60000), DisburseType::Cash)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Expense(ExpenseError::BudgetExceeded { .. })
    ));
    assert_eq!(err.status_code(), 400);
    assert_eq!(h.store.claim_count(), 2);
}

#[tokio::test]
async fn test_creation_requires_approved_budget() {
    let h = Harness::new();
    let manager = h.at_home(&[Role::BusinessManager]);
    h.workflow
        .submit_budget(&manager, &as_map(&json!({ "FUEL": 1000 })))
        .await
        .unwrap();

    let err = h
        .claim(&manager, dec!(10), DisburseType::Cash)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Expense(ExpenseError::NoApprovedBudget)
    ));
    assert_eq!(h.store.claim_count(), 0);
}

#[tokio::test]
async fn test_only_business_managers_create_claims() {
    let h = Harness::new();
    h.standard_budget().await;
    let admin = h.at_home(&[Role::Admin]);

    let err = h
        .claim(&admin, dec!(10), DisburseType::Cash)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(
        err.public_message(),
        "You do not have permission to perform this action"
    );
}

#[tokio::test]
async fn test_invalid_input_is_a_validation_error() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let mut input = fuel(dec!(10), DisburseType::Cash);
    input.attachments.clear();

    let err = h.workflow.create_claim(&manager, input).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.error_code(), "MISSING_ATTACHMENT");
}

#[tokio::test]
async fn test_unstorable_amount_is_refused_before_any_write() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);

    for amount in [dec!(0.00001), dec!(10.12345), Decimal::MAX] {
        let err = h
            .claim(&manager, amount, DisburseType::Cash)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{amount}");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
    }
    assert_eq!(h.store.claim_count(), 0);

    let claim = h
        .claim(&manager, dec!(10.1234), DisburseType::Cash)
        .await
        .unwrap();
    assert_eq!(claim.amount, dec!(10.1234));
}

#[tokio::test]
async fn test_cross_location_admin_cannot_approve() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let claim = h
        .claim(&manager, dec!(500), DisburseType::Cash)
        .await
        .unwrap();

    let remote_admin = h.actor(LocationId::new(), &[Role::Admin]);
    let err = h
        .workflow
        .approve_claim(&remote_admin, claim.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let stored = h.store.find_claim(claim.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ExpenseStatus::Pending);
    assert_eq!(stored.version, claim.version);

    let remote_super = h.actor(LocationId::new(), &[Role::SuperAdmin]);
    let approved = h
        .workflow
        .approve_claim(&remote_super, claim.id)
        .await
        .unwrap();
    assert_eq!(approved.status, ExpenseStatus::Approved);
    assert_eq!(approved.approved_by, Some(remote_super.actor_id()));
}

#[tokio::test]
async fn test_unknown_claim_is_not_found() {
    let h = Harness::new();
    let admin = h.at_home(&[Role::Admin]);
    let err = h
        .workflow
        .approve_claim(&admin, ClaimId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.public_message(), "Resource not found");
}

#[tokio::test]
async fn test_illegal_transition_leaves_record_unchanged() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);
    let claim = h
        .claim(&manager, dec!(500), DisburseType::Cash)
        .await
        .unwrap();
    let rejected = h.workflow.reject_claim(&admin, claim.id).await.unwrap();

    let err = h
        .workflow
        .approve_claim(&admin, claim.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(
        err.public_message(),
        "Only pending expenses can be approved (current status: rejected)"
    );

    let stored = h.store.find_claim(claim.id).await.unwrap().unwrap();
    assert_eq!(stored, rejected);
}

#[tokio::test]
async fn test_rejected_claims_leave_spend_retroactively() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);

    let first = h
        .claim(&manager, dec!(30000), DisburseType::Cash)
        .await
        .unwrap();
    let second = h
        .claim(&manager, dec!(20000), DisburseType::Cash)
        .await
        .unwrap();
    h.workflow.approve_claim(&admin, second.id).await.unwrap();

    let before = h
        .workflow
        .remaining_budget(&admin, None, None, None)
        .await
        .unwrap();
    assert_eq!(before.spent_this_month, dec!(50000));

    h.workflow.reject_claim(&admin, first.id).await.unwrap();
    let after = h
        .workflow
        .remaining_budget(&admin, None, None, None)
        .await
        .unwrap();
    assert_eq!(after.spent_this_month, dec!(20000));
    assert_eq!(after.remaining, dec!(80000));

    // Released budget is available again.
    h.claim(&manager, dec!(80000), DisburseType::Cash)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cashier_cannot_pay_cheque_claim_but_accountant_can() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);
    let cashier = h.at_home(&[Role::Cashier]);
    let accountant = h.at_home(&[Role::Accountant]);

    let claim = h
        .claim(&manager, dec!(12000), DisburseType::ChequeOrTransfer)
        .await
        .unwrap();
    h.workflow.approve_claim(&admin, claim.id).await.unwrap();

    let err = h
        .workflow
        .disburse_claim(&cashier, claim.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let err = h
        .workflow
        .disburse_claim(&accountant, claim.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MISSING_PAYMENT_DETAILS");

    let paid = h
        .workflow
        .disburse_claim(&accountant, claim.id, Some(full_payment(dec!(12000))))
        .await
        .unwrap();
    assert_eq!(paid.status, ExpenseStatus::Disbursed);
    assert_eq!(paid.disbursed_by, Some(accountant.actor_id()));
    assert_eq!(paid.payment, full_payment(dec!(12000)));

    let err = h
        .workflow
        .disburse_claim(&accountant, claim.id, Some(full_payment(dec!(12000))))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_reassignment_hands_claim_to_other_rail() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);
    let cashier = h.at_home(&[Role::Cashier]);
    let accountant = h.at_home(&[Role::Accountant]);

    let claim = h
        .claim(&manager, dec!(900), DisburseType::Cash)
        .await
        .unwrap();

    // Not approved yet.
    let err = h
        .workflow
        .reassign_disburse_type(&cashier, claim.id, DisburseType::ChequeOrTransfer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    h.workflow.approve_claim(&admin, claim.id).await.unwrap();

    let err = h
        .workflow
        .disburse_claim(&accountant, claim.id, Some(full_payment(dec!(900))))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    // Accountants can only hand claims over to cash.
    let err = h
        .workflow
        .reassign_disburse_type(&accountant, claim.id, DisburseType::ChequeOrTransfer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let moved = h
        .workflow
        .reassign_disburse_type(&cashier, claim.id, DisburseType::ChequeOrTransfer)
        .await
        .unwrap();
    assert_eq!(moved.disburse_type, DisburseType::ChequeOrTransfer);
    assert_eq!(moved.status, ExpenseStatus::Approved);

    let paid = h
        .workflow
        .disburse_claim(&accountant, claim.id, Some(full_payment(dec!(900))))
        .await
        .unwrap();
    assert_eq!(paid.status, ExpenseStatus::Disbursed);
}

#[tokio::test]
async fn test_reassign_to_same_rail_is_rejected() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);
    let accountant = h.at_home(&[Role::Accountant]);
    let claim = h
        .claim(&manager, dec!(900), DisburseType::Cash)
        .await
        .unwrap();
    h.workflow.approve_claim(&admin, claim.id).await.unwrap();

    let err = h
        .workflow
        .reassign_disburse_type(&accountant, claim.id, DisburseType::Cash)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_budget_submission_is_unique_and_locks_after_approval() {
    let h = Harness::new();
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);

    let first = h
        .workflow
        .submit_budget(&manager, &as_map(&json!({ "FUEL": 1000, "BAD": "x" })))
        .await
        .unwrap();
    let second = h
        .workflow
        .submit_budget(&manager, &as_map(&json!({ "FUEL": 2000 })))
        .await
        .unwrap();
    assert_eq!(h.store.budget_count(), 1);
    assert_eq!(second.id, first.id);
    assert_eq!(second.amount, dec!(2000));
    assert_eq!(second.status, BudgetStatus::Pending);

    let approved = h
        .workflow
        .action_budget(&admin, first.id, "approve")
        .await
        .unwrap();
    assert_eq!(approved.status, BudgetStatus::Approved);
    assert_eq!(approved.approved_by, Some(admin.actor_id()));

    let err = h
        .workflow
        .submit_budget(&manager, &as_map(&json!({ "FUEL": 9000 })))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Budget(BudgetError::BudgetLocked)));
    let listed = h
        .workflow
        .list_budgets(&manager, None, None, None)
        .await
        .unwrap();
    assert_eq!(listed, vec![approved.clone()]);

    // Admins may still overwrite; the budget stays approved.
    let overwritten = h
        .workflow
        .submit_budget(&admin, &as_map(&json!({ "FUEL": 5000 })))
        .await
        .unwrap();
    assert_eq!(overwritten.status, BudgetStatus::Approved);
    assert_eq!(overwritten.amount, dec!(5000));
    assert_eq!(h.store.budget_count(), 1);
}

#[tokio::test]
async fn test_budget_submission_rejects_empty_figures() {
    let h = Harness::new();
    let manager = h.at_home(&[Role::BusinessManager]);
    let err = h
        .workflow
        .submit_budget(&manager, &as_map(&json!({ "FUEL": 0, "TRAVEL": "-5" })))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Budget(BudgetError::InvalidAmount)));
    assert_eq!(h.store.budget_count(), 0);

    let cashier = h.at_home(&[Role::Cashier]);
    let err = h
        .workflow
        .submit_budget(&cashier, &as_map(&json!({ "FUEL": 10 })))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_overflowing_budget_figures_are_a_validation_error() {
    let h = Harness::new();
    let manager = h.at_home(&[Role::BusinessManager]);
    let figures = json!({
        "FUEL": "79228162514264337593543950335",
        "UTILITIES": "79228162514264337593543950335",
    });

    let err = h
        .workflow
        .submit_budget(&manager, &as_map(&figures))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");

    let err = h
        .workflow
        .submit_budget(&manager, &as_map(&json!({ "FUEL": "40000.00001" })))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
    assert_eq!(h.store.budget_count(), 0);
}

#[tokio::test]
async fn test_budget_actions() {
    let h = Harness::new();
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);
    let budget = h
        .workflow
        .submit_budget(&manager, &as_map(&json!({ "FUEL": 1000 })))
        .await
        .unwrap();

    let err = h
        .workflow
        .action_budget(&admin, BudgetId::new(), "approve")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = h
        .workflow
        .action_budget(&admin, budget.id, "archive")
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_ACTION");

    let remote_admin = h.actor(LocationId::new(), &[Role::Admin]);
    let err = h
        .workflow
        .action_budget(&remote_admin, budget.id, "approve")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let rejected = h
        .workflow
        .action_budget(&admin, budget.id, "reject")
        .await
        .unwrap();
    assert_eq!(rejected.status, BudgetStatus::Rejected);
    assert_eq!(rejected.approved_by, None);

    let err = h
        .workflow
        .action_budget(&admin, budget.id, "approve")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_remaining_budget_scoping() {
    let h = Harness::new();
    h.standard_budget().await;
    let remote_manager = h.actor(LocationId::new(), &[Role::BusinessManager]);
    let remote_accountant = h.actor(LocationId::new(), &[Role::Accountant]);

    let err = h
        .workflow
        .remaining_budget(&remote_manager, Some(h.location), None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let summary = h
        .workflow
        .remaining_budget(&remote_accountant, Some(h.location), None, None)
        .await
        .unwrap();
    assert_eq!(summary.total_budget, dec!(100000));
    assert_eq!(summary.location_id, h.location);

    let err = h
        .workflow
        .remaining_budget(&remote_accountant, Some(h.location), Some(13), None)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_PERIOD");

    // A period with no budget reports zero.
    let current = h.workflow.current_period();
    let summary = h
        .workflow
        .remaining_budget(
            &remote_accountant,
            Some(h.location),
            Some(current.month),
            Some(current.year - 1),
        )
        .await
        .unwrap();
    assert!(!summary.has_approved_budget);
    assert_eq!(summary.total_budget, Decimal::ZERO);
}

#[tokio::test]
async fn test_claim_reads_are_location_scoped() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);
    let first = h
        .claim(&manager, dec!(100), DisburseType::Cash)
        .await
        .unwrap();
    let second = h
        .claim(&manager, dec!(200), DisburseType::Cash)
        .await
        .unwrap();
    h.workflow.approve_claim(&admin, second.id).await.unwrap();

    let remote = h.actor(LocationId::new(), &[Role::BusinessManager]);
    let err = h.workflow.get_claim(&remote, first.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let err = h
        .workflow
        .list_claims(
            &remote,
            ClaimQuery {
                location_id: Some(h.location),
                ..ClaimQuery::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(
        h.workflow
            .list_claims(&remote, ClaimQuery::default())
            .await
            .unwrap()
            .is_empty()
    );

    let pending = h
        .workflow
        .list_claims(
            &manager,
            ClaimQuery {
                status: Some(ExpenseStatus::Pending),
                ..ClaimQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first.id);

    let root = h.actor(LocationId::new(), &[Role::SuperAdmin]);
    let all = h
        .workflow
        .list_claims(&root, ClaimQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(
        h.workflow.get_claim(&root, first.id).await.unwrap().id,
        first.id
    );

    let err = h
        .workflow
        .list_claims(
            &root,
            ClaimQuery {
                month: Some(0),
                ..ClaimQuery::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_notifications_follow_transitions() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);
    let cashier = h.at_home(&[Role::Cashier]);
    let remote_super = h.actor(LocationId::new(), &[Role::SuperAdmin]);
    let remote_cashier = h.actor(LocationId::new(), &[Role::Cashier]);

    let claim = h
        .claim(&manager, dec!(700), DisburseType::Cash)
        .await
        .unwrap();
    h.workflow.dispatcher().drain().await;

    let admin_inbox = h.workflow.list_notifications(&admin, false).await.unwrap();
    assert_eq!(admin_inbox.len(), 1);
    assert_eq!(
        admin_inbox[0].link.as_deref(),
        Some(format!("/expenses/{}", claim.id).as_str())
    );
    assert_eq!(
        h.workflow
            .list_notifications(&remote_super, false)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(
        h.workflow
            .list_notifications(&cashier, false)
            .await
            .unwrap()
            .is_empty()
    );

    h.workflow.approve_claim(&admin, claim.id).await.unwrap();
    h.workflow.dispatcher().drain().await;

    let cashier_inbox = h.workflow.list_notifications(&cashier, true).await.unwrap();
    assert_eq!(cashier_inbox.len(), 1);
    assert_eq!(cashier_inbox[0].title, "Expense ready for payout");
    assert!(
        h.workflow
            .list_notifications(&remote_cashier, false)
            .await
            .unwrap()
            .is_empty()
    );

    let read = h
        .workflow
        .mark_notification_read(&cashier, cashier_inbox[0].id)
        .await
        .unwrap();
    assert!(read.is_read);
    assert!(
        h.workflow
            .list_notifications(&cashier, true)
            .await
            .unwrap()
            .is_empty()
    );

    // Someone else's notification is invisible.
    let err = h
        .workflow
        .mark_notification_read(&admin, cashier_inbox[0].id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = h
        .workflow
        .mark_notification_read(&admin, NotificationId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_notification_failure_never_fails_transition() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);
    h.store.fail_notifications(true);

    let claim = h
        .claim(&manager, dec!(700), DisburseType::Cash)
        .await
        .unwrap();
    h.workflow.dispatcher().drain().await;

    let stored = h.store.find_claim(claim.id).await.unwrap();
    assert_eq!(stored, Some(claim));
    h.store.fail_notifications(false);
    assert!(
        h.store
            .list_notifications(admin.actor_id(), false)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_lost_race_is_concurrent_modification() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);
    let admin = h.at_home(&[Role::Admin]);

    h.store.conflict_next_write();
    let err = h
        .claim(&manager, dec!(100), DisburseType::Cash)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConcurrentModification);
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), 409);
    assert_eq!(h.store.claim_count(), 0);

    let claim = h
        .claim(&manager, dec!(100), DisburseType::Cash)
        .await
        .unwrap();
    h.store.conflict_next_write();
    let err = h
        .workflow
        .approve_claim(&admin, claim.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConcurrentModification);
    let stored = h.store.find_claim(claim.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ExpenseStatus::Pending);
}

#[tokio::test]
async fn test_stale_budget_guard_is_refused() {
    let h = Harness::new();
    h.standard_budget().await;
    let manager = h.at_home(&[Role::BusinessManager]);

    // Two creations validated against the same budget version.
    let first = h
        .claim(&manager, dec!(100), DisburseType::Cash)
        .await
        .unwrap();
    let budget = h
        .workflow
        .list_budgets(&manager, None, None, None)
        .await
        .unwrap()
        .remove(0);
    let stale = crate::store::BudgetGuard {
        budget_id: budget.id,
        version: budget.version - 1,
    };
    let mut twin = first.clone();
    twin.id = ClaimId::new();

    let result = h.store.insert_claim(&twin, stale).await;
    assert!(matches!(
        result,
        Err(crate::store::StoreError::VersionConflict)
    ));
}

#[tokio::test]
async fn test_petty_cash_limit() {
    let h = Harness::new();
    let admin = h.at_home(&[Role::Admin]);
    let manager = h.at_home(&[Role::BusinessManager]);

    let location = h
        .workflow
        .update_petty_cash_limit(&admin, h.location, Some(dec!(25000)))
        .await
        .unwrap();
    assert_eq!(location.monthly_petty_cash_limit, Some(dec!(25000)));
    assert_eq!(
        h.workflow
            .get_location(&manager, h.location)
            .await
            .unwrap()
            .monthly_petty_cash_limit,
        Some(dec!(25000))
    );

    let err = h
        .workflow
        .update_petty_cash_limit(&admin, h.location, Some(dec!(-1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    for limit in [dec!(0.00001), dec!(1000000000000000)] {
        let err = h
            .workflow
            .update_petty_cash_limit(&admin, h.location, Some(limit))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{limit}");
    }

    let err = h
        .workflow
        .update_petty_cash_limit(&manager, h.location, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let cleared = h
        .workflow
        .update_petty_cash_limit(&admin, h.location, None)
        .await
        .unwrap();
    assert_eq!(cleared.monthly_petty_cash_limit, None);

    let root = h.actor(LocationId::new(), &[Role::SuperAdmin]);
    let err = h
        .workflow
        .get_location(&root, LocationId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
