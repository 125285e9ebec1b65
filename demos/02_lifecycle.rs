/// lifecycle - request, review, repayments and settlement under a test clock
use chrono::{Duration, TimeZone, Utc};
use loan_desk_rs::{
    Actor, InMemoryLoanStore, InMemoryRateSetting, LoanManager, LoanStatus, Money, Rate, Role,
    SafeTimeProvider, ServicingConfig, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== loan lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));
    let rates = InMemoryRateSetting::new(Rate::from_percentage(7), time.now());
    let mut desk = LoanManager::new(ServicingConfig::standard(), InMemoryLoanStore::new(), rates, time);

    let admin = Actor::random(Role::Admin);
    let borrower = Actor::random(Role::Borrower);

    // 1. request
    let quote = desk.quote(Money::from_major(6_000), 6)?;
    println!("1. estimate: {} a month at {}", quote.monthly_payment, quote.interest_rate);
    let loan = desk.create(borrower.user_id, Money::from_major(6_000), 6)?;
    println!("   requested, status = {}", loan.status);

    // 2. rate change, then approval locks the new rate
    desk.set_interest_rate(Rate::from_percentage(9), &admin)?;
    desk.time().test_control().unwrap().advance(Duration::days(2));
    let loan = desk.transition(loan.id, LoanStatus::Approved, &admin)?;
    println!("2. approved at {}, first due {}", loan.interest_rate, loan.repayment_schedule[0].due_date.format("%Y-%m-%d"));

    // approving again is a no-op
    let again = desk.transition(loan.id, LoanStatus::Approved, &admin)?;
    println!("   re-approve unchanged: {}", again == loan);

    // 3. monthly repayments, each reviewed by an admin
    for installment in loan.repayment_schedule.iter().take(3) {
        desk.time().test_control().unwrap().advance(Duration::days(30));
        desk.submit_repayment(loan.id, installment.installment_amount, Some(format!("transfer-{}", installment.sequence_number)), &borrower)?;
        let current = desk.confirm_repayment(loan.id, &admin)?;
        println!("3. paid installment {}, outstanding {}", installment.sequence_number, current.outstanding_balance());
    }

    // a bogus submission gets rejected
    desk.record_repayment(loan.id, Money::from_major(5), &borrower)?;
    desk.reject_repayment(loan.id, &admin)?;

    // 4. early settlement
    let current = desk.get_loan(loan.id, &borrower)?;
    desk.record_repayment(loan.id, current.outstanding_balance(), &borrower)?;
    let settled = desk.confirm_repayment(loan.id, &admin)?;
    println!("4. status = {}, repaid {}", settled.status, settled.repayment_amount);

    println!("\nevents:");
    for event in desk.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
