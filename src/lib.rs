//! Loan amortization with accelerated principal payments, compared against
//! investing the same monthly budget.

pub mod api;
pub mod core;
