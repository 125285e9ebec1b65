use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::decimal::Rate;
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::types::LoanId;

/// global interest rate applied to newly approved loans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSetting {
    pub interest_rate: Rate,
    pub updated_at: DateTime<Utc>,
}

/// persistence seam for loans
pub trait LoanStore {
    fn load_loan(&self, id: LoanId) -> Result<Loan>;

    /// upsert; fails with `Conflict` unless the stored version equals
    /// `expected_version` (0 for a new record). Bumps `version` and
    /// stamps `updated_at`.
    fn save_loan(&self, loan: Loan, expected_version: u64, now: DateTime<Utc>) -> Result<Loan>;

    fn list_loans(&self) -> Result<Vec<Loan>>;
}

/// persistence seam for the rate setting
pub trait RateSettingStore {
    fn load_rate_setting(&self) -> Result<RateSetting>;

    fn save_rate_setting(&self, setting: RateSetting) -> Result<()>;
}

impl<T: LoanStore + ?Sized> LoanStore for Arc<T> {
    fn load_loan(&self, id: LoanId) -> Result<Loan> {
        (**self).load_loan(id)
    }

    fn save_loan(&self, loan: Loan, expected_version: u64, now: DateTime<Utc>) -> Result<Loan> {
        (**self).save_loan(loan, expected_version, now)
    }

    fn list_loans(&self) -> Result<Vec<Loan>> {
        (**self).list_loans()
    }
}

impl<T: RateSettingStore + ?Sized> RateSettingStore for Arc<T> {
    fn load_rate_setting(&self) -> Result<RateSetting> {
        (**self).load_rate_setting()
    }

    fn save_rate_setting(&self, setting: RateSetting) -> Result<()> {
        (**self).save_rate_setting(setting)
    }
}

fn poisoned<E>(_: E) -> LoanError {
    LoanError::Storage {
        message: "store lock poisoned".to_string(),
    }
}

/// in-memory loan store
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    loans: RwLock<HashMap<LoanId, Loan>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoanStore for InMemoryLoanStore {
    fn load_loan(&self, id: LoanId) -> Result<Loan> {
        let loans = self.loans.read().map_err(poisoned)?;
        loans.get(&id).cloned().ok_or(LoanError::LoanNotFound { id })
    }

    fn save_loan(&self, mut loan: Loan, expected_version: u64, now: DateTime<Utc>) -> Result<Loan> {
        let mut loans = self.loans.write().map_err(poisoned)?;

        let found = loans.get(&loan.id).map(|l| l.version).unwrap_or(0);
        if found != expected_version {
            return Err(LoanError::Conflict {
                id: loan.id,
                expected: expected_version,
                found,
            });
        }

        loan.version = expected_version + 1;
        loan.updated_at = now;
        loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    fn list_loans(&self) -> Result<Vec<Loan>> {
        let loans = self.loans.read().map_err(poisoned)?;
        let mut all: Vec<Loan> = loans.values().cloned().collect();
        all.sort_by_key(|l| l.created_at);
        Ok(all)
    }
}

/// in-memory rate setting
#[derive(Debug)]
pub struct InMemoryRateSetting {
    setting: RwLock<RateSetting>,
}

impl InMemoryRateSetting {
    pub fn new(interest_rate: Rate, updated_at: DateTime<Utc>) -> Self {
        Self {
            setting: RwLock::new(RateSetting {
                interest_rate,
                updated_at,
            }),
        }
    }
}

impl RateSettingStore for InMemoryRateSetting {
    fn load_rate_setting(&self) -> Result<RateSetting> {
        let setting = self.setting.read().map_err(poisoned)?;
        Ok(*setting)
    }

    fn save_rate_setting(&self, setting: RateSetting) -> Result<()> {
        let mut current = self.setting.write().map_err(poisoned)?;
        *current = setting;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use uuid::Uuid;

    fn loan() -> Loan {
        Loan::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Money::from_major(1_000),
            12,
            Rate::from_percentage(7),
            Utc::now(),
        )
    }

    #[test]
    fn test_save_bumps_version_and_timestamp() {
        let store = InMemoryLoanStore::new();
        let later = Utc::now() + chrono::Duration::hours(1);

        let saved = store.save_loan(loan(), 0, later).unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(saved.updated_at, later);
        assert_eq!(store.load_loan(saved.id).unwrap(), saved);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let store = InMemoryLoanStore::new();
        let saved = store.save_loan(loan(), 0, Utc::now()).unwrap();

        // two writers read version 1
        let first = store.save_loan(saved.clone(), 1, Utc::now());
        let second = store.save_loan(saved, 1, Utc::now());

        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(LoanError::Conflict { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn test_missing_loan() {
        let store = InMemoryLoanStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.load_loan(id), Err(LoanError::LoanNotFound { id: missing }) if missing == id));
    }

    #[test]
    fn test_rate_setting_roundtrip() {
        let now = Utc::now();
        let rates = InMemoryRateSetting::new(Rate::from_percentage(7), now);
        assert_eq!(rates.load_rate_setting().unwrap().interest_rate, Rate::from_percentage(7));

        rates
            .save_rate_setting(RateSetting {
                interest_rate: Rate::from_percentage(9),
                updated_at: now,
            })
            .unwrap();
        assert_eq!(rates.load_rate_setting().unwrap().interest_rate, Rate::from_percentage(9));
    }
}
