use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::LoanStatus;

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
    },

    #[error("invalid principal: {amount}")]
    InvalidPrincipal {
        amount: Money,
    },

    #[error("invalid term: {months} months")]
    InvalidTerm {
        months: u32,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid repayment amount: {amount}")]
    InvalidRepaymentAmount {
        amount: Money,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: Uuid,
    },

    #[error("unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    #[error("user {user_id} is not the borrower of loan {loan_id}")]
    NotBorrower {
        user_id: Uuid,
        loan_id: Uuid,
    },

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: LoanStatus,
        to: LoanStatus,
    },

    #[error("invalid state: current {current}, expected {expected}")]
    InvalidState {
        current: String,
        expected: String,
    },

    #[error("version conflict on loan {id}: expected {expected}, found {found}")]
    Conflict {
        id: Uuid,
        expected: u64,
        found: u64,
    },

    #[error("storage failure: {message}")]
    Storage {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

/// machine-distinguishable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
    InvalidState,
    Infrastructure,
}

impl ErrorKind {
    /// stable code for api payloads
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Authorization => "AUTHORIZATION_ERROR",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::Infrastructure => "INTERNAL_ERROR",
        }
    }
}

impl LoanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoanError::Validation { .. }
            | LoanError::InvalidPrincipal { .. }
            | LoanError::InvalidTerm { .. }
            | LoanError::InvalidInterestRate { .. }
            | LoanError::InvalidRepaymentAmount { .. } => ErrorKind::Validation,
            LoanError::LoanNotFound { .. } => ErrorKind::NotFound,
            LoanError::Unauthorized { .. } | LoanError::NotBorrower { .. } => {
                ErrorKind::Authorization
            }
            LoanError::InvalidTransition { .. } | LoanError::InvalidState { .. } => {
                ErrorKind::InvalidState
            }
            LoanError::Conflict { .. }
            | LoanError::Storage { .. }
            | LoanError::InvalidConfiguration { .. } => ErrorKind::Infrastructure,
        }
    }

    /// http status the surrounding service should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            LoanError::Unauthorized { .. } => 401,
            LoanError::NotBorrower { .. } => 403,
            LoanError::LoanNotFound { .. } => 404,
            LoanError::Conflict { .. } => 409,
            _ => match self.kind() {
                ErrorKind::Validation | ErrorKind::InvalidState => 400,
                _ => 500,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_statuses() {
        let err = LoanError::InvalidTerm { months: 0 };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.http_status(), 400);

        let err = LoanError::NotBorrower {
            user_id: Uuid::new_v4(),
            loan_id: Uuid::new_v4(),
        };
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(err.http_status(), 403);

        let err = LoanError::InvalidTransition {
            from: LoanStatus::Rejected,
            to: LoanStatus::Approved,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(err.to_string(), "invalid transition: rejected -> approved");

        let err = LoanError::Conflict {
            id: Uuid::new_v4(),
            expected: 1,
            found: 2,
        };
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert_eq!(err.http_status(), 409);
        assert_eq!(err.kind().code(), "INTERNAL_ERROR");
    }
}
