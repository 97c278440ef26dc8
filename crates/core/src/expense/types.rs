//! Expense claim domain types.

use chrono::{DateTime, NaiveDate, Utc};
use claimflow_shared::types::{ClaimId, LocationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::Role;
use crate::budget::BudgetPeriod;

/// Claim status in the approval workflow.
///
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject, terminal)
/// - Approved → Disbursed (disburse, terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpenseStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved and waiting for payout.
    Approved,
    /// Rejected (terminal).
    Rejected,
    /// Paid out (terminal).
    Disbursed,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Disbursed => "disbursed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "disbursed" => Some(Self::Disbursed),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Disbursed)
    }

    /// Returns true if a claim in this status consumes budget.
    ///
    /// Claims count from the moment they are created; only rejection
    /// releases the amount.
    #[must_use]
    pub const fn counts_against_budget(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment rail a claim is paid out through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisburseType {
    /// Paid from the petty cash box by a Cashier.
    Cash,
    /// Paid by cheque or online transfer by an Accountant.
    ChequeOrTransfer,
}

impl DisburseType {
    /// Returns the string representation of the rail.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::ChequeOrTransfer => "ChequeOrTransfer",
        }
    }

    /// Parses a rail from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "cash" => Some(Self::Cash),
            "chequeortransfer" | "chequeonlinetransfer" | "cheque" | "transfer" => {
                Some(Self::ChequeOrTransfer)
            }
            _ => None,
        }
    }

    /// The role that pays out claims on this rail.
    #[must_use]
    pub const fn disbursing_role(&self) -> Role {
        match self {
            Self::Cash => Role::Cashier,
            Self::ChequeOrTransfer => Role::Accountant,
        }
    }
}

impl fmt::Display for DisburseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expense category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    /// Vehicle fuel.
    Fuel,
    /// Scheduled vehicle maintenance.
    VehicleMaintenance,
    /// Unscheduled vehicle repair.
    VehicleRepair,
    /// Road tolls.
    TollTax,
    /// Vehicle parking.
    Parking,
    /// Electricity, water, gas.
    Utilities,
    /// Stationery and consumables.
    OfficeSupplies,
    /// Staff refreshments.
    Refreshments,
    /// Staff travel.
    Travel,
    /// Premises repairs.
    Repairs,
    /// Anything else.
    Miscellaneous,
}

impl ExpenseType {
    /// Every expense type.
    pub const ALL: [Self; 11] = [
        Self::Fuel,
        Self::VehicleMaintenance,
        Self::VehicleRepair,
        Self::TollTax,
        Self::Parking,
        Self::Utilities,
        Self::OfficeSupplies,
        Self::Refreshments,
        Self::Travel,
        Self::Repairs,
        Self::Miscellaneous,
    ];

    /// Returns the category code, shared with budget category keys.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Fuel => "FUEL",
            Self::VehicleMaintenance => "VEHICLE_MAINTENANCE",
            Self::VehicleRepair => "VEHICLE_REPAIR",
            Self::TollTax => "TOLL_TAX",
            Self::Parking => "PARKING",
            Self::Utilities => "UTILITIES",
            Self::OfficeSupplies => "OFFICE_SUPPLIES",
            Self::Refreshments => "REFRESHMENTS",
            Self::Travel => "TRAVEL",
            Self::Repairs => "REPAIRS",
            Self::Miscellaneous => "MISCELLANEOUS",
        }
    }

    /// Parses a category code, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|t| t.code() == upper)
    }

    /// Vehicle and route related types need both a route and a vehicle.
    #[must_use]
    pub const fn requires_route_and_vehicle(&self) -> bool {
        matches!(
            self,
            Self::Fuel | Self::VehicleMaintenance | Self::VehicleRepair | Self::TollTax | Self::Parking
        )
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Cheque/transfer payout details, as supplied at disbursement.
///
/// Every field is optional on input; the cheque/transfer rail requires all
/// of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Payee account title.
    pub account_title: Option<String>,
    /// Payee account number.
    pub account_no: Option<String>,
    /// Payee bank.
    pub bank_name: Option<String>,
    /// Cheque or transfer date.
    pub cheque_date: Option<NaiveDate>,
    /// Amount actually paid.
    pub disbursed_amount: Option<Decimal>,
}

impl PaymentDetails {
    /// Names of the fields that are absent or blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.account_title) {
            missing.push("account_title");
        }
        if blank(&self.account_no) {
            missing.push("account_no");
        }
        if blank(&self.bank_name) {
            missing.push("bank_name");
        }
        if self.cheque_date.is_none() {
            missing.push("cheque_date");
        }
        if self.disbursed_amount.is_none() {
            missing.push("disbursed_amount");
        }
        missing
    }

    /// Returns true if no field was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing_fields().len() == 5
    }
}

/// An expense claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseClaim {
    /// Claim ID.
    pub id: ClaimId,
    /// Expense category.
    pub expense_type: ExpenseType,
    /// Claimed amount, always > 0.
    pub amount: Decimal,
    /// Free-text description.
    pub details: String,
    /// Current payout rail.
    pub disburse_type: DisburseType,
    /// Workflow status.
    pub status: ExpenseStatus,
    /// Location the claim is charged to.
    pub location_id: LocationId,
    /// Budget period the claim consumes.
    pub period: BudgetPeriod,
    /// Route reference (vehicle-related types).
    pub route_id: Option<String>,
    /// Vehicle reference (vehicle-related types).
    pub vehicle_id: Option<String>,
    /// Stored-file references, in upload order.
    pub attachments: Vec<String>,
    /// Business Manager who raised the claim.
    pub created_by: UserId,
    /// Approver.
    pub approved_by: Option<UserId>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Rejecter.
    pub rejected_by: Option<UserId>,
    /// Rejection time.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Disburser.
    pub disbursed_by: Option<UserId>,
    /// Disbursement time.
    pub disbursed_at: Option<DateTime<Utc>>,
    /// Payout details recorded at disbursement.
    pub payment: PaymentDetails,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

/// Input for raising a claim.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClaimInput {
    /// Expense category.
    pub expense_type: ExpenseType,
    /// Claimed amount.
    pub amount: Decimal,
    /// Free-text description.
    pub details: String,
    /// Payout rail.
    pub disburse_type: DisburseType,
    /// Route reference.
    #[serde(default)]
    pub route_id: Option<String>,
    /// Vehicle reference.
    #[serde(default)]
    pub vehicle_id: Option<String>,
    /// Stored-file references.
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Filter for listing claims.
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    /// Restrict to one location (`None` = all locations).
    pub location_id: Option<LocationId>,
    /// Restrict to one status.
    pub status: Option<ExpenseStatus>,
    /// Restrict to one period month.
    pub month: Option<u32>,
    /// Restrict to one period year.
    pub year: Option<i32>,
}
