//! Inbound adapters feeding requests to the orchestrator.

pub mod json;
