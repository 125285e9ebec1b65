pub mod actor;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod loan;
pub mod payments;
pub mod store;
pub mod types;
pub mod views;

// re-export key types
pub use actor::Actor;
pub use config::ServicingConfig;
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, LoanError, Result};
pub use events::{Event, EventStore};
pub use lifecycle::LoanManager;
pub use loan::Loan;
pub use payments::{
    generate_schedule, AmortizationCalculator, Installment, RepaymentQuote, RepaymentRequest,
    RepaymentSchedule,
};
pub use store::{InMemoryLoanStore, InMemoryRateSetting, LoanStore, RateSetting, RateSettingStore};
pub use types::{
    AmortizationMethod, InstallmentStatus, LoanId, LoanStatus, RepaymentStatus, Role,
    TransitionPolicy, UserId,
};
pub use views::LoanView;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
