use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};
use uuid::Uuid;

use crate::actor::Actor;
use crate::config::ServicingConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::payments::{validate_repayment_amount, AmortizationCalculator, RepaymentQuote};
use crate::store::{LoanStore, RateSetting, RateSettingStore};
use crate::types::{LoanId, LoanStatus, RepaymentStatus, TransitionPolicy, UserId};

/// loan lifecycle manager: validates and authorizes every state change and
/// persists the result through the injected stores
pub struct LoanManager<S, R> {
    config: ServicingConfig,
    store: S,
    rates: R,
    time: SafeTimeProvider,
    events: EventStore,
}

impl<S: LoanStore, R: RateSettingStore> LoanManager<S, R> {
    pub fn new(config: ServicingConfig, store: S, rates: R, time: SafeTimeProvider) -> Self {
        Self {
            config,
            store,
            rates,
            time,
            events: EventStore::new(),
        }
    }

    pub fn time(&self) -> &SafeTimeProvider {
        &self.time
    }

    /// create a pending loan request
    pub fn create(&mut self, borrower_id: UserId, principal: Money, term_months: u32) -> Result<Loan> {
        self.validate_request(principal, term_months)?;

        let now = self.time.now();
        // display estimate only; the charged rate is fixed at approval
        let estimate = self.rates.load_rate_setting()?.interest_rate;

        let loan = Loan::new(Uuid::new_v4(), borrower_id, principal, term_months, estimate, now);
        let loan = self.store.save_loan(loan, 0, now)?;

        info!(loan_id = %loan.id, %borrower_id, principal = %loan.principal, term_months, "loan requested");

        self.events.emit(Event::LoanRequested {
            loan_id: loan.id,
            borrower_id,
            principal: loan.principal,
            term_months,
            timestamp: now,
        });

        Ok(loan)
    }

    /// move a pending loan to approved or rejected
    pub fn transition(&mut self, loan_id: LoanId, requested: LoanStatus, actor: &Actor) -> Result<Loan> {
        let mut loan = self.store.load_loan(loan_id)?;
        self.require_admin(actor, "only admins may change loan status")?;

        if !requested.is_requestable() {
            return Err(self.invalid_transition(&loan, requested));
        }

        if loan.status == requested {
            match self.config.transition_policy {
                TransitionPolicy::TolerateSameStatus => return Ok(loan),
                TransitionPolicy::Strict => return Err(self.invalid_transition(&loan, requested)),
            }
        }

        if loan.status != LoanStatus::Pending {
            return Err(self.invalid_transition(&loan, requested));
        }

        let now = self.time.now();
        let expected_version = loan.version;
        let old_status = loan.status;

        if requested == LoanStatus::Approved {
            let rate = self.rates.load_rate_setting()?.interest_rate;
            let calculator = AmortizationCalculator::new(self.config.schedule_config.amortization_method);
            let schedule = calculator.calculate_schedule(loan.principal, rate, loan.term_months, now)?;
            loan.attach_schedule(rate, schedule, now);
        }
        loan.update_status(requested, now);

        let loan = self.store.save_loan(loan, expected_version, now)?;

        info!(loan_id = %loan.id, from = %old_status, to = %requested, rate = %loan.interest_rate, "loan status changed");

        self.events.emit(Event::StatusChanged {
            loan_id: loan.id,
            old_status,
            new_status: requested,
            timestamp: now,
        });
        match requested {
            LoanStatus::Approved => self.events.emit(Event::LoanApproved {
                loan_id: loan.id,
                approved_by: actor.user_id,
                interest_rate: loan.interest_rate,
                periodic_payment: loan
                    .repayment_schedule
                    .first()
                    .map(|i| i.installment_amount)
                    .unwrap_or(Money::ZERO),
                total_due: loan.total_due(),
                timestamp: now,
            }),
            _ => self.events.emit(Event::LoanRejected {
                loan_id: loan.id,
                rejected_by: actor.user_id,
                timestamp: now,
            }),
        }

        Ok(loan)
    }

    pub fn approve(&mut self, loan_id: LoanId, actor: &Actor) -> Result<Loan> {
        self.transition(loan_id, LoanStatus::Approved, actor)
    }

    pub fn reject(&mut self, loan_id: LoanId, actor: &Actor) -> Result<Loan> {
        self.transition(loan_id, LoanStatus::Rejected, actor)
    }

    /// borrower submits a repayment; held until an admin confirms it
    pub fn record_repayment(&mut self, loan_id: LoanId, amount: Money, actor: &Actor) -> Result<Loan> {
        self.submit_repayment(loan_id, amount, None, actor)
    }

    /// as [`record_repayment`](Self::record_repayment) with a receipt reference
    pub fn submit_repayment(
        &mut self,
        loan_id: LoanId,
        amount: Money,
        receipt: Option<String>,
        actor: &Actor,
    ) -> Result<Loan> {
        validate_repayment_amount(amount)?;
        let mut loan = self.store.load_loan(loan_id)?;

        if !loan.can_accept_repayment() {
            return Err(LoanError::InvalidState {
                current: loan.status.to_string(),
                expected: LoanStatus::Approved.to_string(),
            });
        }
        if !actor.is_borrower_of(&loan) {
            warn!(loan_id = %loan.id, user_id = %actor.user_id, "repayment by non-borrower refused");
            return Err(LoanError::NotBorrower {
                user_id: actor.user_id,
                loan_id: loan.id,
            });
        }

        let now = self.time.now();
        let expected_version = loan.version;
        loan.add_pending_repayment(amount, receipt, now);
        let loan = self.store.save_loan(loan, expected_version, now)?;

        info!(loan_id = %loan.id, %amount, pending = %loan.pending_repayment, "repayment submitted");

        self.events.emit(Event::RepaymentRequested {
            loan_id: loan.id,
            amount,
            pending_total: loan.pending_repayment,
            timestamp: now,
        });

        Ok(loan)
    }

    /// admin moves the pending amount into confirmed repayments
    pub fn confirm_repayment(&mut self, loan_id: LoanId, actor: &Actor) -> Result<Loan> {
        let mut loan = self.load_for_review(loan_id, actor)?;

        let now = self.time.now();
        let expected_version = loan.version;
        let amount = loan.release_pending(RepaymentStatus::Approved, now);
        let applied = loan.apply_confirmed(amount, now);
        let loan = self.store.save_loan(loan, expected_version, now)?;

        info!(
            loan_id = %loan.id,
            %amount,
            total_repaid = %loan.repayment_amount,
            settled = applied.settled,
            "repayment confirmed"
        );

        self.events.emit(Event::RepaymentConfirmed {
            loan_id: loan.id,
            amount,
            total_repaid: loan.repayment_amount,
            outstanding: loan.outstanding_balance(),
            timestamp: now,
        });
        for sequence_number in &applied.installments_paid {
            self.events.emit(Event::InstallmentPaid {
                loan_id: loan.id,
                sequence_number: *sequence_number,
                timestamp: now,
            });
        }
        if applied.settled {
            if applied.discarded_excess.is_positive() {
                warn!(loan_id = %loan.id, excess = %applied.discarded_excess, "repayment above total due discarded");
            }
            self.events.emit(Event::StatusChanged {
                loan_id: loan.id,
                old_status: LoanStatus::Approved,
                new_status: LoanStatus::Paid,
                timestamp: now,
            });
            self.events.emit(Event::LoanPaid {
                loan_id: loan.id,
                total_repaid: loan.repayment_amount,
                discarded_excess: applied.discarded_excess,
                timestamp: now,
            });
        }

        Ok(loan)
    }

    /// admin discards the pending amount
    pub fn reject_repayment(&mut self, loan_id: LoanId, actor: &Actor) -> Result<Loan> {
        let mut loan = self.load_for_review(loan_id, actor)?;

        let now = self.time.now();
        let expected_version = loan.version;
        let amount = loan.release_pending(RepaymentStatus::Rejected, now);
        let loan = self.store.save_loan(loan, expected_version, now)?;

        info!(loan_id = %loan.id, %amount, "repayment rejected");

        self.events.emit(Event::RepaymentRejected {
            loan_id: loan.id,
            amount,
            timestamp: now,
        });

        Ok(loan)
    }

    /// read a loan as its borrower, an admin or a lender
    pub fn get_loan(&self, loan_id: LoanId, actor: &Actor) -> Result<Loan> {
        let loan = self.store.load_loan(loan_id)?;
        if !actor.can_view(&loan) {
            warn!(loan_id = %loan.id, user_id = %actor.user_id, "loan read refused");
            return Err(LoanError::NotBorrower {
                user_id: actor.user_id,
                loan_id: loan.id,
            });
        }
        Ok(loan)
    }

    /// admins and lenders see every loan, borrowers their own
    pub fn list_loans(&self, actor: &Actor) -> Result<Vec<Loan>> {
        let loans = self.store.list_loans()?;
        Ok(loans.into_iter().filter(|l| actor.can_view(l)).collect())
    }

    /// payment estimate at the current rate setting
    pub fn quote(&self, principal: Money, term_months: u32) -> Result<RepaymentQuote> {
        self.validate_request(principal, term_months)?;
        let rate = self.rates.load_rate_setting()?.interest_rate;
        RepaymentQuote::estimate(
            principal,
            term_months,
            rate,
            self.config.schedule_config.amortization_method,
            self.time.now(),
        )
    }

    pub fn current_rate(&self) -> Result<RateSetting> {
        self.rates.load_rate_setting()
    }

    /// admin updates the rate applied to future approvals
    pub fn set_interest_rate(&mut self, rate: Rate, actor: &Actor) -> Result<RateSetting> {
        self.require_admin(actor, "only admins may change the interest rate")?;
        if rate.is_negative() || rate > self.config.rate_config.max_rate {
            return Err(LoanError::InvalidInterestRate { rate });
        }

        let now = self.time.now();
        let old_rate = self.rates.load_rate_setting()?.interest_rate;
        let setting = RateSetting {
            interest_rate: rate,
            updated_at: now,
        };
        self.rates.save_rate_setting(setting)?;

        info!(old_rate = %old_rate, new_rate = %rate, "interest rate changed");

        self.events.emit(Event::InterestRateChanged {
            old_rate,
            new_rate: rate,
            changed_by: actor.user_id,
            timestamp: now,
        });

        Ok(setting)
    }

    /// get events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    fn validate_request(&self, principal: Money, term_months: u32) -> Result<()> {
        let limits = &self.config.limits;
        if !principal.is_positive() || principal < limits.minimum_principal {
            return Err(LoanError::InvalidPrincipal { amount: principal });
        }
        if let Some(maximum) = limits.maximum_principal {
            if principal > maximum {
                return Err(LoanError::InvalidPrincipal { amount: principal });
            }
        }
        if term_months == 0 || term_months > limits.max_term_months {
            return Err(LoanError::InvalidTerm { months: term_months });
        }
        Ok(())
    }

    fn require_admin(&self, actor: &Actor, message: &str) -> Result<()> {
        if !actor.is_admin() {
            warn!(user_id = %actor.user_id, role = ?actor.role, "{}", message);
            return Err(LoanError::Unauthorized {
                message: message.to_string(),
            });
        }
        Ok(())
    }

    fn load_for_review(&self, loan_id: LoanId, actor: &Actor) -> Result<Loan> {
        let loan = self.store.load_loan(loan_id)?;
        self.require_admin(actor, "only admins may review repayments")?;

        if !loan.can_accept_repayment() {
            return Err(LoanError::InvalidState {
                current: loan.status.to_string(),
                expected: LoanStatus::Approved.to_string(),
            });
        }
        if loan.pending_repayment.is_zero() {
            return Err(LoanError::InvalidState {
                current: "no pending repayment".to_string(),
                expected: "pending repayment".to_string(),
            });
        }
        Ok(loan)
    }

    fn invalid_transition(&self, loan: &Loan, requested: LoanStatus) -> LoanError {
        warn!(loan_id = %loan.id, from = %loan.status, to = %requested, "invalid transition");
        LoanError::InvalidTransition {
            from: loan.status,
            to: requested,
        }
    }
}
