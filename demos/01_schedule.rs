/// schedule - compare equal installments with the flat-interest method
use chrono::{TimeZone, Utc};
use loan_desk_rs::{AmortizationMethod, Money, Rate, RepaymentQuote, RepaymentSchedule};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== repayment schedules ===\n");

    let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
    let principal = Money::from_major(1_200);
    let rate = Rate::from_percentage(12);

    for method in [AmortizationMethod::EqualInstallments, AmortizationMethod::FlatInterest] {
        let schedule = RepaymentSchedule::generate(principal, rate, 12, start, method)?;

        println!("{:?}", method);
        println!("  #  due          payment  principal  interest  balance");
        for i in &schedule.installments {
            println!(
                "  {:>2} {}  {:>8}  {:>9}  {:>8}  {:>8}",
                i.sequence_number,
                i.due_date.format("%Y-%m-%d"),
                i.installment_amount,
                i.principal_portion,
                i.interest_portion,
                i.remaining_balance,
            );
        }
        println!("  total interest: {}", schedule.total_interest);
        println!("  total repayable: {}\n", schedule.total_repayable);
    }

    let quote = RepaymentQuote::estimate(
        Money::from_major(1_000),
        12,
        Rate::from_percentage(7),
        AmortizationMethod::FlatInterest,
        start,
    )?;
    println!("estimate at {}: {} a month, {} in total", quote.interest_rate, quote.monthly_payment, quote.total_repayment);

    Ok(())
}
