//! Monthly milk payment calculation for dairy farms.
//!
//! Daily production records are aggregated per farm and calendar month,
//! priced with the semester rules in [`domain::pricing`], and stored as
//! [`domain::payment::MonthlyPayment`] snapshots. Read paths convert the price
//! per liter to a display currency through a [`domain::ports::RateSource`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
