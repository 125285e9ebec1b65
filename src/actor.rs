use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::loan::Loan;
use crate::types::{Role, UserId};

/// authenticated caller, as resolved by the surrounding auth layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// fresh identity with a random id, mostly for tests and demos
    pub fn random(role: Role) -> Self {
        Self::new(Uuid::new_v4(), role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// may list every loan
    pub fn sees_all_loans(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Lender)
    }

    pub fn is_borrower_of(&self, loan: &Loan) -> bool {
        loan.is_borrower(self.user_id)
    }

    /// the loan's borrower, or a role that sees every loan
    pub fn can_view(&self, loan: &Loan) -> bool {
        self.sees_all_loans() || self.is_borrower_of(loan)
    }
}
