use serde::Serialize;

use super::error::ConfigError;

/// Upper bound on any duration accepted at the boundary (100 years).
pub const MAX_SCHEDULE_MONTHS: u32 = 1_200;

/// Upper bound on the annual loan and investment rates, in percent.
pub const MAX_ANNUAL_RATE_PERCENT: f64 = 100.0;

/// Immutable inputs for one schedule run. Rates are annual percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub loan_total: f64,
    pub loan_duration: u32,
    pub loan_interest: f64,
    pub invest_interest: f64,
    /// Months (from month 1) during which surplus is used for extra principal.
    pub prefer_loan_duration: u32,
    pub measure_duration: u32,
    /// Monthly budget; it covers the regular installment first.
    pub monthly_available: f64,
}

impl Config {
    /// Simulated months: never shorter than the loan itself.
    pub fn effective_measure_duration(&self) -> u32 {
        self.measure_duration.max(self.loan_duration)
    }

    pub fn has_loan(&self) -> bool {
        self.loan_total > 0.0 && self.loan_duration > 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let money = [
            ("loan-total", self.loan_total),
            ("loan-interest", self.loan_interest),
            ("invest-interest", self.invest_interest),
            ("monthly-available", self.monthly_available),
        ];
        for (field, value) in money {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { field });
            }
        }

        let rates = [
            ("loan-interest", self.loan_interest),
            ("invest-interest", self.invest_interest),
        ];
        for (field, value) in rates {
            if value > MAX_ANNUAL_RATE_PERCENT {
                return Err(ConfigError::RateTooHigh {
                    field,
                    max: MAX_ANNUAL_RATE_PERCENT,
                });
            }
        }

        let months = [
            ("loan-duration", self.loan_duration),
            ("measure-duration", self.measure_duration),
        ];
        for (field, value) in months {
            if value > MAX_SCHEDULE_MONTHS {
                return Err(ConfigError::TooManyMonths {
                    field,
                    max: MAX_SCHEDULE_MONTHS,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: u32,
    /// Monthly budget plus whatever was carried over from the previous month.
    pub available_total: f64,
    pub loan_principal: f64,
    pub loan_interest: f64,
    pub loan_additional: f64,
    pub loan_new_total: f64,
    pub loan_new_duration: u32,
    pub additional_unused: f64,
    pub loan_saved: f64,
    pub invest_add: f64,
    pub invest_interest: f64,
    pub invest_new_total: f64,
}

impl MonthlyRecord {
    pub fn loan_active(&self) -> bool {
        self.loan_principal > 0.0
    }

    pub fn loan_payment(&self) -> f64 {
        self.loan_principal + self.loan_interest + self.loan_additional
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub monthly_data: Vec<MonthlyRecord>,
    /// Installment times the original duration, with no extra payments.
    pub total_loan_expected: f64,
    pub total_loan_paid: f64,
    pub loan_monthly: f64,
    pub invest_result: f64,
    /// Investment balance when the whole surplus is invested from month 1.
    pub invest_max: f64,
}

impl ScheduleResult {
    /// Negative when prepaying reduced the total paid.
    pub fn loan_saved_percent(&self) -> f64 {
        if self.total_loan_expected <= 0.0 {
            return 0.0;
        }
        -(1.0 - self.total_loan_paid / self.total_loan_expected) * 100.0
    }

    pub fn invest_delta_percent(&self) -> f64 {
        if self.invest_max.abs() < 1e-9 {
            return 0.0;
        }
        -(1.0 - self.invest_result / self.invest_max) * 100.0
    }

    pub fn payoff_month(&self) -> Option<u32> {
        self.monthly_data
            .iter()
            .find(|m| m.loan_active() && m.loan_new_duration == 0)
            .map(|m| m.month)
    }
}
