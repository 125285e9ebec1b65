use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::amortization::RepaymentSchedule;
use crate::types::AmortizationMethod;

/// payment estimate shown to a borrower before requesting a loan.
///
/// The rate is the current setting, not a commitment: the rate actually
/// charged is fixed when the loan is approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentQuote {
    pub principal: Money,
    pub term_months: u32,
    pub interest_rate: Rate,
    pub method: AmortizationMethod,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_repayment: Money,
}

impl RepaymentQuote {
    pub fn estimate(
        principal: Money,
        term_months: u32,
        interest_rate: Rate,
        method: AmortizationMethod,
        as_of: DateTime<Utc>,
    ) -> Result<Self> {
        let schedule =
            RepaymentSchedule::generate(principal, interest_rate, term_months, as_of, method)?;

        Ok(Self {
            principal: schedule.principal,
            term_months,
            interest_rate,
            method,
            monthly_payment: schedule.periodic_payment(),
            total_interest: schedule.total_interest,
            total_repayment: schedule.total_repayable,
        })
    }
}
