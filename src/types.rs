use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a user
pub type UserId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// requested by the borrower, awaiting review
    Pending,
    /// approved, schedule generated, repayments accepted
    Approved,
    /// declined by an admin
    Rejected,
    /// fully repaid
    Paid,
}

impl LoanStatus {
    /// statuses an admin may request through a transition
    pub fn is_requestable(&self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::Rejected)
    }

    /// a repayment schedule exists in this status
    pub fn has_schedule(&self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::Paid)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Paid => "paid",
        };
        f.write_str(s)
    }
}

/// installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pending,
    Paid,
}

/// review status of a borrower-submitted repayment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepaymentStatus {
    Pending,
    Approved,
    Rejected,
}

/// user role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Borrower,
    Lender,
    Admin,
}

/// amortization method used when generating a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationMethod {
    /// equal payment amounts throughout term (EMI)
    EqualInstallments,
    /// equal principal plus flat interest on the original principal
    FlatInterest,
}

/// what happens when an admin re-requests the status a loan already has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// return the loan unchanged
    TolerateSameStatus,
    /// fail with an invalid transition
    Strict,
}
