use super::payment::{installment, monthly_rate, principal_portion};
use super::types::{Config, MonthlyRecord, ScheduleResult};

const CONSERVATION_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct LoanState {
    balance: f64,
    remaining_months: u32,
    invest_balance: f64,
    carried_unused: f64,
}

impl LoanState {
    fn opening(config: &Config) -> Self {
        Self {
            balance: config.loan_total,
            remaining_months: config.loan_duration,
            invest_balance: 0.0,
            carried_unused: 0.0,
        }
    }

    fn loan_open(&self) -> bool {
        self.balance > 0.0 && self.remaining_months > 0
    }
}

pub fn run_schedule(config: &Config) -> ScheduleResult {
    let measure_duration = config.effective_measure_duration();
    let loan_monthly = regular_installment(config);
    let invest_rate = monthly_rate(config.invest_interest);

    let mut state = LoanState::opening(config);
    let mut monthly_data = Vec::with_capacity(measure_duration as usize);

    for month in 1..=measure_duration {
        let record = simulate_month(config, month, loan_monthly, invest_rate, &state);
        state = LoanState {
            balance: record.loan_new_total,
            remaining_months: record.loan_new_duration,
            invest_balance: record.invest_new_total,
            carried_unused: record.additional_unused,
        };
        monthly_data.push(record);
    }

    let total_loan_paid = monthly_data
        .iter()
        .fold(0.0, |acc, m| acc + m.loan_payment());
    let invest_result = monthly_data.last().map_or(0.0, |m| m.invest_new_total);
    let result = ScheduleResult {
        total_loan_expected: loan_monthly * f64::from(config.loan_duration),
        total_loan_paid,
        loan_monthly,
        invest_result,
        invest_max: invest_max_baseline(config),
        monthly_data,
    };

    tracing::debug!(
        months = measure_duration,
        payoff_month = ?result.payoff_month(),
        total_loan_paid = result.total_loan_paid,
        invest_result = result.invest_result,
        invest_max = result.invest_max,
        "schedule computed"
    );
    result
}

/// Investment balance reached by putting `monthly_available - installment`
/// into the fund every month and never prepaying the loan.
pub fn invest_max_baseline(config: &Config) -> f64 {
    let invest_rate = monthly_rate(config.invest_interest);
    let contribution = config.monthly_available - regular_installment(config);
    let mut balance = 0.0;
    for _ in 0..config.effective_measure_duration() {
        balance = balance + invest_rate * balance + contribution;
    }
    balance
}

fn regular_installment(config: &Config) -> f64 {
    if config.has_loan() {
        installment(config.loan_interest, config.loan_duration, config.loan_total)
    } else {
        0.0
    }
}

fn simulate_month(
    config: &Config,
    month: u32,
    loan_monthly: f64,
    invest_rate: f64,
    state: &LoanState,
) -> MonthlyRecord {
    let available_total = config.monthly_available + state.carried_unused;
    let mut record = MonthlyRecord {
        month,
        available_total,
        additional_unused: available_total,
        ..MonthlyRecord::default()
    };

    let prepaying = month <= config.prefer_loan_duration;
    let loan_open = state.loan_open();
    if loan_open {
        let rate = config.loan_interest;
        record.loan_principal = principal_portion(1, rate, state.remaining_months, state.balance);
        record.loan_interest = loan_monthly - record.loan_principal;

        let extra = if prepaying {
            allocate_extra_principal(
                available_total - loan_monthly,
                rate,
                state.remaining_months - 1,
                state.balance - record.loan_principal,
            )
        } else {
            Vec::new()
        };

        record.loan_additional = extra.iter().fold(0.0, |acc, p| acc + p);
        record.additional_unused = available_total - loan_monthly - record.loan_additional;
        record.loan_saved = extra.iter().fold(0.0, |acc, p| acc + (loan_monthly - p));

        let new_duration = (state.remaining_months - 1).saturating_sub(extra.len() as u32);
        let new_total = (state.balance - record.loan_principal - record.loan_additional).max(0.0);
        // Paid off is absorbing: drop rounding residue and keep both fields in step.
        if new_duration == 0 || new_total <= 0.0 {
            record.loan_new_duration = 0;
            record.loan_new_total = 0.0;
        } else {
            record.loan_new_duration = new_duration;
            record.loan_new_total = new_total;
        }
    }

    if record.loan_new_duration == 0 || !prepaying {
        record.invest_add = record.additional_unused;
        record.additional_unused = 0.0;
    }
    record.invest_interest = invest_rate * state.invest_balance;
    record.invest_new_total = state.invest_balance + record.invest_add + record.invest_interest;

    let installment_paid = if loan_open { loan_monthly } else { 0.0 };
    debug_assert!(
        budget_conserved(&record, installment_paid),
        "budget not conserved in month {month}: {record:?}"
    );
    record
}

/// Greedily takes the next principal portions of the hypothetical schedule
/// (`duration` months left on `balance`) while their running sum stays below
/// `budget`. If the last accepted portion overshoots the budget it is dropped,
/// so the sum never exceeds `budget`.
fn allocate_extra_principal(
    budget: f64,
    annual_rate: f64,
    duration: u32,
    balance: f64,
) -> Vec<f64> {
    if balance <= 0.0 || duration == 0 {
        return Vec::new();
    }

    let mut payments: Vec<f64> = Vec::new();
    let mut spent = 0.0;
    while spent < budget && (payments.len() as u32) < duration {
        let period = payments.len() as u32 + 1;
        let next = principal_portion(period, annual_rate, duration, balance);
        if next.is_nan() || next <= 0.0 {
            break;
        }
        spent += next;
        payments.push(next);
    }
    if spent > budget {
        payments.pop();
    }
    payments
}

/// `installment_paid` is the regular installment when the loan was open at the
/// start of the month, 0 otherwise.
fn budget_conserved(record: &MonthlyRecord, installment_paid: f64) -> bool {
    let accounted =
        installment_paid + record.loan_additional + record.additional_unused + record.invest_add;
    let tol = CONSERVATION_EPS * record.available_total.abs().max(1.0);
    (record.available_total - accounted).abs() <= tol
}
