//! Property-based tests for ExpenseStateMachine.

use chrono::Utc;
use claimflow_shared::types::{LocationId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::budget::BudgetPeriod;
use crate::expense::machine::ExpenseStateMachine;
use crate::expense::types::{
    DisburseType, ExpenseClaim, ExpenseStatus, ExpenseType, NewClaimInput, PaymentDetails,
};

fn arb_status() -> impl Strategy<Value = ExpenseStatus> {
    prop_oneof![
        Just(ExpenseStatus::Pending),
        Just(ExpenseStatus::Approved),
        Just(ExpenseStatus::Rejected),
        Just(ExpenseStatus::Disbursed),
    ]
}

fn arb_disburse_type() -> impl Strategy<Value = DisburseType> {
    prop_oneof![Just(DisburseType::Cash), Just(DisburseType::ChequeOrTransfer)]
}

fn claim_in(status: ExpenseStatus, disburse_type: DisburseType) -> ExpenseClaim {
    let mut claim = ExpenseStateMachine::open(
        NewClaimInput {
            expense_type: ExpenseType::OfficeSupplies,
            amount: Decimal::new(1250, 2),
            details: "Printer paper".to_string(),
            disburse_type,
            route_id: None,
            vehicle_id: None,
            attachments: vec!["r.pdf".to_string()],
        },
        UserId::new(),
        LocationId::new(),
        BudgetPeriod { month: 1, year: 2026 },
        Utc::now(),
    )
    .unwrap();
    claim.status = status;
    claim
}

fn full_payment() -> PaymentDetails {
    PaymentDetails {
        account_title: Some("Payee".to_string()),
        account_no: Some("1".to_string()),
        bank_name: Some("Bank".to_string()),
        cheque_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 2),
        disbursed_amount: Some(Decimal::new(1250, 2)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every transition either follows a legal edge or fails leaving the
    /// input untouched.
    #[test]
    fn prop_transitions_follow_edges(status in arb_status(), rail in arb_disburse_type()) {
        let claim = claim_in(status, rail);
        let before = claim.clone();
        let actor = UserId::new();
        let now = Utc::now();

        let attempts = [
            (ExpenseStatus::Approved, ExpenseStateMachine::approve(&claim, actor, now)),
            (ExpenseStatus::Rejected, ExpenseStateMachine::reject(&claim, actor, now)),
            (
                ExpenseStatus::Disbursed,
                ExpenseStateMachine::disburse(&claim, actor, Some(full_payment()), now),
            ),
        ];

        for (target, result) in attempts {
            let legal = ExpenseStateMachine::is_valid_transition(status, target);
            match result {
                Ok(updated) => {
                    prop_assert!(legal);
                    prop_assert_eq!(updated.status, target);
                }
                Err(err) => {
                    prop_assert!(!legal);
                    prop_assert!(err.is_state_error());
                }
            }
        }
        prop_assert_eq!(claim, before);
    }

    /// Reassignment keeps the status and only works on approved claims.
    #[test]
    fn prop_reassign_keeps_status(status in arb_status(), rail in arb_disburse_type()) {
        let claim = claim_in(status, rail);
        let target = match rail {
            DisburseType::Cash => DisburseType::ChequeOrTransfer,
            DisburseType::ChequeOrTransfer => DisburseType::Cash,
        };

        match ExpenseStateMachine::reassign(&claim, target, Utc::now()) {
            Ok(updated) => {
                prop_assert_eq!(status, ExpenseStatus::Approved);
                prop_assert_eq!(updated.status, ExpenseStatus::Approved);
                prop_assert_eq!(updated.disburse_type, target);
            }
            Err(_) => prop_assert_ne!(status, ExpenseStatus::Approved),
        }
    }

    /// Non-positive amounts never produce a claim.
    #[test]
    fn prop_non_positive_amount_rejected(cents in -1_000_000i64..=0) {
        let input = NewClaimInput {
            expense_type: ExpenseType::Utilities,
            amount: Decimal::new(cents, 2),
            details: "Water".to_string(),
            disburse_type: DisburseType::Cash,
            route_id: None,
            vehicle_id: None,
            attachments: vec!["bill.pdf".to_string()],
        };
        prop_assert!(ExpenseStateMachine::validate(&input).is_err());
    }
}
