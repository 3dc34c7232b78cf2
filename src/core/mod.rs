mod engine;
mod error;
mod payment;
mod types;

pub use engine::{invest_max_baseline, run_schedule};
pub use error::ConfigError;
pub use payment::{installment, interest_portion, monthly_rate, principal_portion};
pub use types::{
    Config, MAX_ANNUAL_RATE_PERCENT, MAX_SCHEDULE_MONTHS, MonthlyRecord, ScheduleResult,
};
