//! Fixed-installment annuity math.
//!
//! Rates are annual percentages and durations are whole months. None of these
//! functions guard against `duration == 0` or a non-positive principal; the
//! results in that region are meaningless and callers must not go there.

const ZERO_RATE_EPS: f64 = 1e-12;

pub fn monthly_rate(annual_percent: f64) -> f64 {
    annual_percent / 100.0 / 12.0
}

/// Fixed periodic payment that amortizes `principal` over `duration` months.
pub fn installment(annual_rate: f64, duration: u32, principal: f64) -> f64 {
    let r = monthly_rate(annual_rate);
    let n = f64::from(duration);
    if r.abs() < ZERO_RATE_EPS {
        return principal / n;
    }
    principal * r / (1.0 - (1.0 + r).powf(-n))
}

/// Principal component of the installment due at 1-indexed `period`.
///
/// Discounts the installment back from the end of the schedule, so no term
/// grows with `duration` and long high-rate loans stay finite.
pub fn principal_portion(period: u32, annual_rate: f64, duration: u32, principal: f64) -> f64 {
    let r = monthly_rate(annual_rate);
    let n = f64::from(duration);
    if r.abs() < ZERO_RATE_EPS {
        return principal / n;
    }
    let periods_to_end = n - f64::from(period) + 1.0;
    installment(annual_rate, duration, principal) * (1.0 + r).powf(-periods_to_end)
}

pub fn interest_portion(period: u32, annual_rate: f64, duration: u32, principal: f64) -> f64 {
    installment(annual_rate, duration, principal)
        - principal_portion(period, annual_rate, duration, principal)
}
