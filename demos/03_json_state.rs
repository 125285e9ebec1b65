/// json state - loan views and configuration as json
use chrono::{TimeZone, Utc};
use loan_desk_rs::{
    Actor, AmortizationMethod, InMemoryLoanStore, InMemoryRateSetting, LoanManager, LoanView,
    Money, Rate, Role, SafeTimeProvider, ServicingConfig, TimeSource, TransitionPolicy,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state serialization ===\n");

    let config = ServicingConfig::standard()
        .with_transition_policy(TransitionPolicy::Strict)
        .with_amortization_method(AmortizationMethod::EqualInstallments);
    println!("config:\n{}\n", config.to_json_pretty()?);

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    ));
    let rates = InMemoryRateSetting::new(Rate::from_percentage(12), time.now());
    let mut desk = LoanManager::new(ServicingConfig::from_json(&config.to_json_pretty()?)?, InMemoryLoanStore::new(), rates, time);

    let admin = Actor::random(Role::Admin);
    let borrower = Actor::random(Role::Borrower);

    let loan = desk.create(borrower.user_id, Money::from_major(1_200), 3)?;
    println!("stage 1: pending\n{}\n", LoanView::from_loan(&loan).to_json_pretty()?);

    let loan = desk.approve(loan.id, &admin)?;
    println!("stage 2: approved\n{}\n", LoanView::from_loan(&loan).to_json_pretty()?);

    // strict policy: a second approval is refused
    if let Err(err) = desk.approve(loan.id, &admin) {
        println!("re-approve refused ({}): {}", err.http_status(), err);
    }

    Ok(())
}
