use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::{AmortizationMethod, InstallmentStatus};

/// one period of a repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub sequence_number: u32,
    pub due_date: DateTime<Utc>,
    pub installment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
    pub status: InstallmentStatus,
}

/// repayment schedule with derived totals
#[derive(Debug, Clone, PartialEq)]
pub struct RepaymentSchedule {
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub start_date: DateTime<Utc>,
    pub method: AmortizationMethod,
    pub installments: Vec<Installment>,
    pub total_interest: Money,
    pub total_repayable: Money,
}

impl RepaymentSchedule {
    /// generate a schedule and its totals
    pub fn generate(
        principal: Money,
        interest_rate: Rate,
        term_months: u32,
        start_date: DateTime<Utc>,
        method: AmortizationMethod,
    ) -> Result<Self> {
        let calculator = AmortizationCalculator::new(method);
        let installments =
            calculator.calculate_schedule(principal, interest_rate, term_months, start_date)?;

        let total_interest = total_interest(&installments);
        let total_repayable = installments.iter().map(|i| i.installment_amount).sum();

        Ok(Self {
            principal: principal.round_cents(),
            interest_rate,
            term_months,
            start_date,
            method,
            installments,
            total_interest,
            total_repayable,
        })
    }

    /// get installment by 1-based sequence number
    pub fn get_installment(&self, sequence_number: u32) -> Option<&Installment> {
        if sequence_number == 0 {
            return None;
        }
        self.installments.get((sequence_number - 1) as usize)
    }

    /// regular periodic payment (the first installment's amount)
    pub fn periodic_payment(&self) -> Money {
        self.installments
            .first()
            .map(|i| i.installment_amount)
            .unwrap_or(Money::ZERO)
    }
}

/// sum of interest portions
pub fn total_interest(installments: &[Installment]) -> Money {
    installments.iter().map(|i| i.interest_portion).sum()
}

/// sum of principal portions
pub fn total_principal(installments: &[Installment]) -> Money {
    installments.iter().map(|i| i.principal_portion).sum()
}

/// amortization calculator
pub struct AmortizationCalculator {
    method: AmortizationMethod,
}

impl AmortizationCalculator {
    pub fn new(method: AmortizationMethod) -> Self {
        Self { method }
    }

    /// calculate full schedule; due dates are `start_date` plus 1..=n calendar months
    pub fn calculate_schedule(
        &self,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: DateTime<Utc>,
    ) -> Result<Vec<Installment>> {
        validate_terms(principal, annual_rate, term_months)?;

        let principal = principal.round_cents();
        let installments = match self.method {
            AmortizationMethod::EqualInstallments => {
                self.calculate_equal_installments(principal, annual_rate, term_months, start_date)?
            }
            AmortizationMethod::FlatInterest => {
                self.calculate_flat_interest(principal, annual_rate, term_months, start_date)?
            }
        };

        debug!(
            method = ?self.method,
            %principal,
            rate = %annual_rate,
            term_months,
            "generated repayment schedule"
        );

        Ok(installments)
    }

    /// equal installments (EMI)
    fn calculate_equal_installments(
        &self,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: DateTime<Utc>,
    ) -> Result<Vec<Installment>> {
        let monthly_rate = annual_rate.monthly_rate();
        // rounded before the split so every stored row sums exactly and the
        // principal portions add back to the principal
        let emi = calculate_emi(principal, annual_rate, term_months)?.round_cents();

        let mut installments = Vec::with_capacity(term_months as usize);
        let mut balance = principal;

        for i in 1..=term_months {
            let interest_portion = balance.apply_rate(monthly_rate).round_cents();
            let mut principal_portion = emi - interest_portion;

            // the last period absorbs rounding drift
            if i == term_months || balance < principal_portion {
                principal_portion = balance;
            }
            balance -= principal_portion;

            installments.push(Installment {
                sequence_number: i,
                due_date: add_months(start_date, i)?,
                installment_amount: (principal_portion + interest_portion).round_cents(),
                principal_portion,
                interest_portion,
                remaining_balance: balance.max(Money::ZERO).round_cents(),
                status: InstallmentStatus::Pending,
            });
        }

        Ok(installments)
    }

    /// equal principal plus flat interest on the original principal
    fn calculate_flat_interest(
        &self,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: DateTime<Utc>,
    ) -> Result<Vec<Installment>> {
        let interest_portion = principal.apply_rate(annual_rate.monthly_rate()).round_cents();
        let level_principal = (principal / Decimal::from(term_months)).round_cents();

        let mut installments = Vec::with_capacity(term_months as usize);
        let mut balance = principal;

        for i in 1..=term_months {
            let principal_portion = if i == term_months || balance < level_principal {
                balance
            } else {
                level_principal
            };
            balance -= principal_portion;

            installments.push(Installment {
                sequence_number: i,
                due_date: add_months(start_date, i)?,
                installment_amount: (principal_portion + interest_portion).round_cents(),
                principal_portion,
                interest_portion,
                remaining_balance: balance.max(Money::ZERO).round_cents(),
                status: InstallmentStatus::Pending,
            });
        }

        Ok(installments)
    }
}

/// generate an EMI schedule
pub fn generate_schedule(
    principal: Money,
    term_months: u32,
    annual_rate: Rate,
    start_date: DateTime<Utc>,
) -> Result<Vec<Installment>> {
    AmortizationCalculator::new(AmortizationMethod::EqualInstallments).calculate_schedule(
        principal,
        annual_rate,
        term_months,
        start_date,
    )
}

fn validate_terms(principal: Money, annual_rate: Rate, term_months: u32) -> Result<()> {
    if !principal.is_positive() {
        return Err(LoanError::InvalidPrincipal { amount: principal });
    }
    if term_months == 0 {
        return Err(LoanError::InvalidTerm { months: term_months });
    }
    if annual_rate.is_negative() {
        return Err(LoanError::InvalidInterestRate { rate: annual_rate });
    }
    Ok(())
}

/// unrounded EMI amount; fails when `(1 + r)^n` leaves decimal range
pub fn calculate_emi(principal: Money, annual_rate: Rate, months: u32) -> Result<Money> {
    if months == 0 {
        return Ok(principal);
    }

    let r = annual_rate.monthly_rate().as_decimal();

    if r.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let overflow = || LoanError::Validation {
        message: format!(
            "payment for {} over {} months at {} is out of range",
            principal, months, annual_rate
        ),
    };

    // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1), factor computed before P
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..months {
        compound = compound.checked_mul(base).ok_or_else(overflow)?;
    }

    let factor = r
        .checked_mul(compound)
        .and_then(|n| n.checked_div(compound - Decimal::ONE))
        .ok_or_else(overflow)?;
    let emi = principal.as_decimal().checked_mul(factor).ok_or_else(overflow)?;

    Ok(Money::from_decimal(emi))
}

/// add calendar months, clamping to the last day of shorter months
pub fn add_months(date: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LoanError::Validation {
            message: format!("due date out of range: {} + {} months", date, months),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use rust_decimal_macros::dec;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_reference_emi_schedule() {
        let schedule =
            generate_schedule(Money::from_major(1_200), 12, Rate::from_percentage(12), start())
                .unwrap();

        assert_eq!(schedule.len(), 12);

        let first = &schedule[0];
        assert_eq!(first.installment_amount, Money::from_cents(10_662));
        assert_eq!(first.interest_portion, Money::from_cents(1_200));
        assert_eq!(first.principal_portion, Money::from_cents(9_462));
        assert_eq!(first.remaining_balance, Money::from_cents(110_538));

        let last = &schedule[11];
        assert_eq!(last.remaining_balance, Money::ZERO);
        assert_eq!(total_principal(&schedule), Money::from_major(1_200));
    }

    #[test]
    fn test_zero_rate_schedule() {
        let schedule =
            generate_schedule(Money::from_major(1_000), 10, Rate::ZERO, start()).unwrap();

        assert_eq!(schedule.len(), 10);
        for installment in &schedule {
            assert_eq!(installment.installment_amount, Money::from_major(100));
            assert_eq!(installment.interest_portion, Money::ZERO);
        }
        assert_eq!(schedule[9].remaining_balance, Money::ZERO);
    }

    #[test]
    fn test_final_period_absorbs_rounding() {
        let schedule =
            generate_schedule(Money::from_major(1_000), 3, Rate::ZERO, start()).unwrap();

        assert_eq!(schedule[0].principal_portion, Money::from_cents(33_333));
        assert_eq!(schedule[1].principal_portion, Money::from_cents(33_333));
        assert_eq!(schedule[2].principal_portion, Money::from_cents(33_334));
        assert_eq!(schedule[2].remaining_balance, Money::ZERO);
    }

    #[test]
    fn test_schedule_properties_across_terms() {
        let cases = [
            (Money::from_major(500), 1, Rate::from_percentage(5)),
            (Money::from_decimal(dec!(12345.67)), 7, Rate::from_percent(dec!(7.25))),
            (Money::from_major(250_000), 360, Rate::from_percent(dec!(6.5))),
            (Money::from_major(99), 48, Rate::from_percentage(29)),
        ];

        for (principal, term, rate) in cases {
            let schedule = generate_schedule(principal, term, rate, start()).unwrap();

            assert_eq!(schedule.len(), term as usize);
            assert_eq!(schedule.last().unwrap().remaining_balance, Money::ZERO);
            let drift = (total_principal(&schedule) - principal).abs();
            assert!(drift <= Money::CENT, "principal drift {} for {}", drift, principal);

            for installment in &schedule {
                assert!(installment.installment_amount.is_whole_cents());
                assert!(installment.principal_portion >= Money::ZERO);
                assert_eq!(
                    installment.installment_amount,
                    installment.principal_portion + installment.interest_portion
                );
            }
        }
    }

    #[test]
    fn test_due_dates_step_by_calendar_month() {
        let schedule =
            generate_schedule(Money::from_major(1_200), 14, Rate::from_percentage(12), start())
                .unwrap();

        assert_eq!(schedule[0].due_date, Utc.with_ymd_and_hms(2024, 2, 15, 9, 30, 0).unwrap());
        for pair in schedule.windows(2) {
            assert_eq!(add_months(pair[0].due_date, 1).unwrap(), pair[1].due_date);
        }
        assert_eq!(schedule[13].due_date.month(), 3);
        assert_eq!(schedule[13].due_date.year(), 2025);
    }

    #[test]
    fn test_month_end_clamping() {
        let jan_31 = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(add_months(jan_31, 1).unwrap().day(), 29);
        assert_eq!(add_months(jan_31, 2).unwrap().day(), 31);
    }

    #[test]
    fn test_invalid_inputs() {
        let rate = Rate::from_percentage(10);
        assert!(matches!(
            generate_schedule(Money::ZERO, 12, rate, start()),
            Err(LoanError::InvalidPrincipal { .. })
        ));
        assert!(matches!(
            generate_schedule(Money::from_major(-5), 12, rate, start()),
            Err(LoanError::InvalidPrincipal { .. })
        ));
        assert!(matches!(
            generate_schedule(Money::from_major(100), 0, rate, start()),
            Err(LoanError::InvalidTerm { months: 0 })
        ));
        assert!(matches!(
            generate_schedule(Money::from_major(100), 12, Rate::from_percent(dec!(-1)), start()),
            Err(LoanError::InvalidInterestRate { .. })
        ));
    }

    #[test]
    fn test_compound_overflow_is_an_error() {
        let result =
            generate_schedule(Money::from_major(1_000), 480, Rate::from_percentage(500), start());
        assert!(matches!(result, Err(LoanError::Validation { .. })));

        assert!(calculate_emi(Money::from_major(1_000), Rate::from_percentage(1_000), 12_000).is_err());
    }

    #[test]
    fn test_large_principal_long_term() {
        let principal = Money::from_major(1_000_000_000_000_000_000);
        let schedule =
            generate_schedule(principal, 480, Rate::from_percentage(100), start()).unwrap();

        assert_eq!(schedule.len(), 480);
        assert_eq!(schedule[479].remaining_balance, Money::ZERO);
        assert_eq!(total_principal(&schedule), principal);
    }

    #[test]
    fn test_flat_interest_schedule() {
        let schedule = RepaymentSchedule::generate(
            Money::from_major(1_000),
            Rate::from_percentage(12),
            12,
            start(),
            AmortizationMethod::FlatInterest,
        )
        .unwrap();

        // 1000 / 12 = 83.33 principal, 1000 * 1% = 10.00 interest
        assert_eq!(schedule.installments[0].principal_portion, Money::from_cents(8_333));
        assert_eq!(schedule.installments[0].interest_portion, Money::from_major(10));
        assert_eq!(schedule.installments[11].principal_portion, Money::from_cents(8_337));
        assert_eq!(schedule.total_interest, Money::from_major(120));
        assert_eq!(schedule.total_repayable, Money::from_major(1_120));
    }

    #[test]
    fn test_schedule_totals() {
        let schedule = RepaymentSchedule::generate(
            Money::from_major(1_200),
            Rate::from_percentage(12),
            12,
            start(),
            AmortizationMethod::EqualInstallments,
        )
        .unwrap();

        assert_eq!(schedule.periodic_payment(), Money::from_cents(10_662));
        assert_eq!(schedule.total_repayable, schedule.principal + schedule.total_interest);
        assert!(schedule.get_installment(0).is_none());
        assert_eq!(schedule.get_installment(12).unwrap().remaining_balance, Money::ZERO);
    }
}
