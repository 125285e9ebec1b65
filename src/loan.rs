use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::payments::{total_interest, Installment, RepaymentRequest};
use crate::types::{InstallmentStatus, LoanId, LoanStatus, RepaymentStatus, UserId};

/// loan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    // identification
    pub id: LoanId,
    pub borrower_id: UserId,

    // requested terms
    pub principal: Money,
    pub term_months: u32,

    /// estimate while pending, snapshot of the rate setting once approved
    pub interest_rate: Rate,
    pub rate_locked_at: Option<DateTime<Utc>>,

    // status
    pub status: LoanStatus,
    pub repayment_schedule: Vec<Installment>,

    // repayment tracking
    pub repayment_amount: Money,
    pub pending_repayment: Money,
    pub repayment_requests: Vec<RepaymentRequest>,

    // dates
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_status_change: DateTime<Utc>,

    /// bumped by the store on every save
    pub version: u64,
}

/// result of applying confirmed funds to a loan
#[derive(Debug, Clone, PartialEq)]
pub struct RepaymentApplication {
    pub applied: Money,
    pub discarded_excess: Money,
    pub installments_paid: Vec<u32>,
    pub settled: bool,
}

impl Loan {
    /// create new pending loan
    pub fn new(
        id: LoanId,
        borrower_id: UserId,
        principal: Money,
        term_months: u32,
        estimated_rate: Rate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            borrower_id,
            principal: principal.round_cents(),
            term_months,
            interest_rate: estimated_rate,
            rate_locked_at: None,
            status: LoanStatus::Pending,
            repayment_schedule: Vec::new(),
            repayment_amount: Money::ZERO,
            pending_repayment: Money::ZERO,
            repayment_requests: Vec::new(),
            created_at,
            updated_at: created_at,
            last_status_change: created_at,
            version: 0,
        }
    }

    /// interest over the whole schedule
    pub fn total_interest(&self) -> Money {
        total_interest(&self.repayment_schedule)
    }

    /// principal plus scheduled interest
    pub fn total_due(&self) -> Money {
        self.principal + self.total_interest()
    }

    /// total due less confirmed repayments
    pub fn outstanding_balance(&self) -> Money {
        if !self.status.has_schedule() {
            return Money::ZERO;
        }
        (self.total_due() - self.repayment_amount).max(Money::ZERO)
    }

    /// first installment not yet covered by confirmed repayments
    pub fn next_installment(&self) -> Option<&Installment> {
        self.repayment_schedule
            .iter()
            .find(|i| i.status == InstallmentStatus::Pending)
    }

    pub fn is_borrower(&self, user_id: UserId) -> bool {
        self.borrower_id == user_id
    }

    /// check if loan accepts repayment requests
    pub fn can_accept_repayment(&self) -> bool {
        self.status == LoanStatus::Approved
    }

    /// update status
    pub fn update_status(&mut self, new_status: LoanStatus, timestamp: DateTime<Utc>) {
        self.status = new_status;
        self.last_status_change = timestamp;
    }

    /// fix the rate and attach the generated schedule
    pub fn attach_schedule(
        &mut self,
        rate: Rate,
        schedule: Vec<Installment>,
        timestamp: DateTime<Utc>,
    ) {
        self.interest_rate = rate;
        self.rate_locked_at = Some(timestamp);
        self.repayment_schedule = schedule;
    }

    /// hold a borrower-submitted amount until reviewed
    pub fn add_pending_repayment(
        &mut self,
        amount: Money,
        receipt: Option<String>,
        timestamp: DateTime<Utc>,
    ) {
        self.pending_repayment += amount;
        self.repayment_requests
            .push(RepaymentRequest::new(amount, receipt, timestamp));
    }

    /// close out pending requests with the review outcome; returns the held amount
    pub fn release_pending(&mut self, outcome: RepaymentStatus, timestamp: DateTime<Utc>) -> Money {
        let amount = self.pending_repayment;
        self.pending_repayment = Money::ZERO;
        for request in self.repayment_requests.iter_mut().filter(|r| r.is_pending()) {
            request.review(outcome, timestamp);
        }
        amount
    }

    /// add confirmed funds, mark covered installments and settle when fully repaid.
    ///
    /// Anything above the total due is dropped, not carried forward.
    pub fn apply_confirmed(&mut self, amount: Money, timestamp: DateTime<Utc>) -> RepaymentApplication {
        let total_due = self.total_due();
        let uncapped = self.repayment_amount + amount;
        let settled = uncapped >= total_due;

        let discarded_excess = (uncapped - total_due).max(Money::ZERO);
        self.repayment_amount = uncapped.min(total_due);

        let mut covered = Money::ZERO;
        let mut installments_paid = Vec::new();
        for installment in self.repayment_schedule.iter_mut() {
            covered += installment.installment_amount;
            if covered > self.repayment_amount {
                break;
            }
            if installment.status == InstallmentStatus::Pending {
                installment.status = InstallmentStatus::Paid;
                installments_paid.push(installment.sequence_number);
            }
        }

        if settled {
            self.update_status(LoanStatus::Paid, timestamp);
        }

        RepaymentApplication {
            applied: amount - discarded_excess,
            discarded_excess,
            installments_paid,
            settled,
        }
    }
}
