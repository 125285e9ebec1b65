pub mod amortization;
pub mod quote;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::RepaymentStatus;

pub use amortization::{
    add_months, calculate_emi, generate_schedule, total_interest, total_principal,
    AmortizationCalculator, Installment, RepaymentSchedule,
};
pub use quote::RepaymentQuote;

/// a borrower-submitted repayment awaiting or past admin review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentRequest {
    pub id: Uuid,
    pub amount: Money,
    /// receipt reference supplied by the borrower (upload url, transfer id)
    pub receipt: Option<String>,
    pub status: RepaymentStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl RepaymentRequest {
    pub fn new(amount: Money, receipt: Option<String>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            receipt,
            status: RepaymentStatus::Pending,
            submitted_at,
            reviewed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RepaymentStatus::Pending
    }

    pub fn review(&mut self, status: RepaymentStatus, reviewed_at: DateTime<Utc>) {
        self.status = status;
        self.reviewed_at = Some(reviewed_at);
    }
}

/// repayments must be positive and carry no sub-cent digits
pub fn validate_repayment_amount(amount: Money) -> Result<()> {
    if !amount.is_positive() || !amount.is_whole_cents() {
        return Err(LoanError::InvalidRepaymentAmount { amount });
    }
    Ok(())
}
