use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be >= 0")]
    Negative { field: &'static str },

    #[error("{field} must be <= {max} percent a year")]
    RateTooHigh { field: &'static str, max: f64 },

    #[error("{field} must be <= {max} months")]
    TooManyMonths { field: &'static str, max: u32 },
}
