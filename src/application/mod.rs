//! Application layer orchestrating the payment workflows.
//!
//! `PaymentService` is the entry point: it composes production aggregation,
//! the pricing rules and currency conversion over injected storage and
//! rate-source ports.

pub mod conversion;
pub mod payments;
