use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use loan_desk_rs::{
    Actor, ErrorKind, Event, InMemoryLoanStore, InMemoryRateSetting, InstallmentStatus,
    LoanManager, LoanStatus, LoanView, Money, Rate, Role, SafeTimeProvider, ServicingConfig,
    TimeSource, Uuid,
};

fn test_time() -> SafeTimeProvider {
    SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap(),
    ))
}

#[test]
fn full_lifecycle_from_request_to_paid() {
    let mut desk = LoanManager::new(
        ServicingConfig::standard(),
        InMemoryLoanStore::new(),
        InMemoryRateSetting::new(Rate::from_percentage(7), Utc::now()),
        test_time(),
    );
    let admin = Actor::random(Role::Admin);
    let borrower = Actor::random(Role::Borrower);

    let quote = desk.quote(Money::from_major(1_200), 12).unwrap();
    assert_eq!(quote.interest_rate, Rate::from_percentage(7));

    let loan = desk.create(borrower.user_id, Money::from_major(1_200), 12).unwrap();
    desk.set_interest_rate(Rate::from_percentage(12), &admin).unwrap();

    desk.time().test_control().unwrap().advance(Duration::days(2));
    let loan = desk.transition(loan.id, LoanStatus::Approved, &admin).unwrap();
    assert_eq!(loan.interest_rate, Rate::from_percentage(12));
    assert_eq!(
        loan.repayment_schedule[0].due_date,
        Utc.with_ymd_and_hms(2024, 4, 7, 10, 0, 0).unwrap()
    );

    let total_due = loan.total_due();
    assert_eq!(total_due, loan.principal + loan.total_interest());

    // pay the first six installments one by one
    for month in 0..6 {
        let amount = loan.repayment_schedule[month].installment_amount;
        desk.record_repayment(loan.id, amount, &borrower).unwrap();
        desk.confirm_repayment(loan.id, &admin).unwrap();
    }
    let halfway = desk.get_loan(loan.id, &borrower).unwrap();
    assert_eq!(halfway.status, LoanStatus::Approved);
    assert_eq!(halfway.next_installment().unwrap().sequence_number, 7);

    // settle the rest in one go, overshooting by 10
    let rest = halfway.outstanding_balance() + Money::from_major(10);
    desk.record_repayment(loan.id, rest, &borrower).unwrap();
    let paid = desk.confirm_repayment(loan.id, &admin).unwrap();

    assert_eq!(paid.status, LoanStatus::Paid);
    assert_eq!(paid.repayment_amount, total_due);
    assert!(paid
        .repayment_schedule
        .iter()
        .all(|i| i.status == InstallmentStatus::Paid));

    let events = desk.take_events();
    assert!(matches!(events.first(), Some(Event::LoanRequested { .. })));
    assert!(matches!(events.last(), Some(Event::LoanPaid { .. })));

    let view = LoanView::from_loan(&paid);
    assert_eq!(view.financial.outstanding_balance, Money::ZERO);
    assert!(view.financial.next_due_date.is_none());
}

#[test]
fn errors_carry_a_kind_for_the_http_layer() {
    let mut desk = LoanManager::new(
        ServicingConfig::standard(),
        InMemoryLoanStore::new(),
        InMemoryRateSetting::new(Rate::from_percentage(7), Utc::now()),
        test_time(),
    );
    let borrower = Actor::random(Role::Borrower);
    let loan = desk.create(borrower.user_id, Money::from_major(900), 9).unwrap();

    let err = desk.create(borrower.user_id, Money::ZERO, 9).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = desk.approve(loan.id, &borrower).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(err.http_status(), 401);

    let err = desk.get_loan(loan.id, &Actor::random(Role::Borrower)).unwrap_err();
    assert_eq!(err.http_status(), 403);

    let err = desk.record_repayment(loan.id, Money::from_major(10), &borrower).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = desk.approve(Uuid::new_v4(), &Actor::random(Role::Admin)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn managers_sharing_a_store_see_each_other() {
    let store = Arc::new(InMemoryLoanStore::new());
    let rates = Arc::new(InMemoryRateSetting::new(Rate::ZERO, Utc::now()));

    let mut intake = LoanManager::new(
        ServicingConfig::standard(),
        Arc::clone(&store),
        Arc::clone(&rates),
        test_time(),
    );
    let mut review = LoanManager::new(
        ServicingConfig::legacy_flat(),
        Arc::clone(&store),
        Arc::clone(&rates),
        test_time(),
    );
    let admin = Actor::random(Role::Admin);

    let loan = intake.create(Uuid::new_v4(), Money::from_major(1_000), 10).unwrap();
    let approved = review.approve(loan.id, &admin).unwrap();

    assert_eq!(approved.version, 2);
    assert_eq!(approved.repayment_schedule.len(), 10);
    assert_eq!(intake.get_loan(loan.id, &admin).unwrap(), approved);
}
