/// quick start - minimal example to get started
use loan_desk_rs::{
    Actor, InMemoryLoanStore, InMemoryRateSetting, LoanManager, LoanView, Money, Rate, Role,
    SafeTimeProvider, ServicingConfig, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let time = SafeTimeProvider::new(TimeSource::System);
    let rates = InMemoryRateSetting::new(Rate::from_percentage(7), time.now());
    let mut desk = LoanManager::new(ServicingConfig::standard(), InMemoryLoanStore::new(), rates, time);

    let admin = Actor::random(Role::Admin);
    let borrower = Actor::random(Role::Borrower);

    // request, approve, repay once
    let loan = desk.create(borrower.user_id, Money::from_major(10_000), 12)?;
    let loan = desk.approve(loan.id, &admin)?;
    desk.record_repayment(loan.id, loan.repayment_schedule[0].installment_amount, &borrower)?;
    let loan = desk.confirm_repayment(loan.id, &admin)?;

    println!("{}", LoanView::from_loan(&loan).to_json_pretty()?);

    Ok(())
}
