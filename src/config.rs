use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};
use crate::types::{AmortizationMethod, TransitionPolicy};

/// servicing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicingConfig {
    pub rate_config: RateConfig,
    pub schedule_config: ScheduleConfig,
    pub limits: LoanLimits,
    pub transition_policy: TransitionPolicy,
}

/// rate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    /// rate seeded into a fresh rate setting
    pub default_rate: Rate,
    /// upper bound accepted by `set_interest_rate`
    pub max_rate: Rate,
}

/// schedule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub amortization_method: AmortizationMethod,
}

/// request limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanLimits {
    pub minimum_principal: Money,
    pub maximum_principal: Option<Money>,
    pub max_term_months: u32,
}

impl ServicingConfig {
    /// EMI schedules, 7% default rate, tolerant re-approval
    pub fn standard() -> Self {
        Self {
            rate_config: RateConfig {
                default_rate: Rate::from_percentage(7),
                max_rate: Rate::from_percentage(100),
            },
            schedule_config: ScheduleConfig {
                amortization_method: AmortizationMethod::EqualInstallments,
            },
            limits: LoanLimits {
                minimum_principal: Money::CENT,
                maximum_principal: None,
                max_term_months: 480,
            },
            transition_policy: TransitionPolicy::TolerateSameStatus,
        }
    }

    /// flat-interest schedules for deployments that must match the old calculator
    pub fn legacy_flat() -> Self {
        Self {
            schedule_config: ScheduleConfig {
                amortization_method: AmortizationMethod::FlatInterest,
            },
            limits: LoanLimits {
                minimum_principal: Money::from_major(100),
                maximum_principal: None,
                max_term_months: 120,
            },
            ..Self::standard()
        }
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    pub fn with_amortization_method(mut self, method: AmortizationMethod) -> Self {
        self.schedule_config.amortization_method = method;
        self
    }

    /// parse and validate a json document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(LoanError::InvalidConfiguration {
                message: message.to_string(),
            })
        };

        if self.rate_config.default_rate.is_negative() {
            return invalid("default rate must not be negative");
        }
        if self.rate_config.default_rate > self.rate_config.max_rate {
            return invalid("default rate exceeds max rate");
        }
        if !self.limits.minimum_principal.is_positive() {
            return invalid("minimum principal must be positive");
        }
        if let Some(maximum) = self.limits.maximum_principal {
            if maximum < self.limits.minimum_principal {
                return invalid("maximum principal below minimum principal");
            }
        }
        if self.limits.max_term_months == 0 {
            return invalid("max term must be at least one month");
        }
        // 1000 years of months is past any date chrono can represent
        if self.limits.max_term_months > 12_000 {
            return invalid("max term too large");
        }
        if self.rate_config.max_rate.as_decimal() > dec!(10) {
            return invalid("max rate above 1000%");
        }
        Ok(())
    }
}

impl Default for ServicingConfig {
    fn default() -> Self {
        Self::standard()
    }
}
