//! Domain types, validation rules and the ports the orchestrator depends on.

pub mod context;
pub mod envelope;
pub mod gateway;
pub mod payment;
pub mod ports;
pub mod transaction;
pub mod validation;
