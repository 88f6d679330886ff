//! Domain entities, the pricing rules, and the ports the application layer
//! talks to.

pub mod farm;
pub mod ids;
pub mod money;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod production;
