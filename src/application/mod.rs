//! Application layer containing the permit transaction orchestration.
//!
//! `TransactionOrchestrator` is the entry point for creating and retrieving
//! permit transactions. It owns the ports it calls and turns every outcome
//! into a `Reply` through the response builder.

pub mod guard;
pub mod orchestrator;
pub mod response;
