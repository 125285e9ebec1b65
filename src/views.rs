//! serialization support for loans
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::loan::Loan;
use crate::payments::{Installment, RepaymentRequest};
use crate::types::{LoanId, LoanStatus, UserId};

/// serializable view of a loan with derived totals
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub id: LoanId,
    pub borrower_id: UserId,
    pub status: LoanStatus,
    pub principal: Money,
    pub term_months: u32,
    pub interest_rate: Rate,
    /// false while the rate is only an estimate
    pub rate_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub financial: FinancialView,
    pub repayment_schedule: Vec<Installment>,
    pub repayment_requests: Vec<RepaymentRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialView {
    pub monthly_payment: Option<Money>,
    pub total_interest: Money,
    pub total_due: Money,
    pub repayment_amount: Money,
    pub pending_repayment: Money,
    pub outstanding_balance: Money,
    pub next_due_date: Option<DateTime<Utc>>,
    pub next_installment_amount: Option<Money>,
}

impl LoanView {
    pub fn from_loan(loan: &Loan) -> Self {
        let next = loan.next_installment();
        let has_schedule = !loan.repayment_schedule.is_empty();

        LoanView {
            id: loan.id,
            borrower_id: loan.borrower_id,
            status: loan.status,
            principal: loan.principal,
            term_months: loan.term_months,
            interest_rate: loan.interest_rate,
            rate_locked: loan.rate_locked_at.is_some(),
            created_at: loan.created_at,
            updated_at: loan.updated_at,
            financial: FinancialView {
                monthly_payment: loan.repayment_schedule.first().map(|i| i.installment_amount),
                total_interest: loan.total_interest(),
                total_due: if has_schedule { loan.total_due() } else { Money::ZERO },
                repayment_amount: loan.repayment_amount,
                pending_repayment: loan.pending_repayment,
                outstanding_balance: loan.outstanding_balance(),
                next_due_date: next.map(|i| i.due_date),
                next_installment_amount: next.map(|i| i.installment_amount),
            },
            repayment_schedule: loan.repayment_schedule.clone(),
            repayment_requests: loan.repayment_requests.clone(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
