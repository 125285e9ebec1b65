use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{LoanId, LoanStatus, UserId};

/// all events that can be emitted by the loan manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanRequested {
        loan_id: LoanId,
        borrower_id: UserId,
        principal: Money,
        term_months: u32,
        timestamp: DateTime<Utc>,
    },
    LoanApproved {
        loan_id: LoanId,
        approved_by: UserId,
        interest_rate: Rate,
        periodic_payment: Money,
        total_due: Money,
        timestamp: DateTime<Utc>,
    },
    LoanRejected {
        loan_id: LoanId,
        rejected_by: UserId,
        timestamp: DateTime<Utc>,
    },
    LoanPaid {
        loan_id: LoanId,
        total_repaid: Money,
        discarded_excess: Money,
        timestamp: DateTime<Utc>,
    },

    // repayment events
    RepaymentRequested {
        loan_id: LoanId,
        amount: Money,
        pending_total: Money,
        timestamp: DateTime<Utc>,
    },
    RepaymentConfirmed {
        loan_id: LoanId,
        amount: Money,
        total_repaid: Money,
        outstanding: Money,
        timestamp: DateTime<Utc>,
    },
    RepaymentRejected {
        loan_id: LoanId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentPaid {
        loan_id: LoanId,
        sequence_number: u32,
        timestamp: DateTime<Utc>,
    },

    // settings events
    InterestRateChanged {
        old_rate: Rate,
        new_rate: Rate,
        changed_by: UserId,
        timestamp: DateTime<Utc>,
    },

    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
