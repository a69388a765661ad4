//! Service configuration loaded from a JSON file.
//!
//! Every field has a default, so an empty object (or no file at all) yields
//! a working offline service with one `CHARGE` transaction type.

use crate::domain::transaction::TransactionType;
use crate::error::Result;
use crate::infrastructure::resilience::GatewayPolicy;
use crate::infrastructure::simulated::{Behavior, PaymentSimulation, TopologySimulation};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    pub rate: GatewayPolicy,
    pub topology: GatewayPolicy,
    pub payments: GatewayPolicy,
    pub simulation: SimulationConfig,
    /// Reference data stored into the transaction type repository at startup.
    pub transaction_types: Vec<TransactionType>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rate: GatewayPolicy::default(),
            topology: GatewayPolicy::default(),
            payments: GatewayPolicy::default(),
            simulation: SimulationConfig::default(),
            transaction_types: vec![TransactionType::new(1, "CHARGE", "Permit charge")],
        }
    }
}

/// How the simulated downstream services answer.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub rate: Behavior,
    pub topology: TopologySimulation,
    pub payments: PaymentSimulation,
}

impl ServiceConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: ServiceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.rate.timeout_ms, 2_000);
        assert_eq!(config.transaction_types[0].label, "CHARGE");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "rate": {{"timeoutMs": 50, "circuitBreaker": {{"failureThreshold": 2}}}},
                "simulation": {{
                    "topology": {{"valid": false}},
                    "payments": {{"record": {{"mode": "unavailable"}}}}
                }},
                "transactionTypes": [{{"id": 3, "label": "REFUND", "description": "Refund"}}]
            }}"#
        )
        .unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();

        assert_eq!(config.rate.timeout_ms, 50);
        assert_eq!(config.rate.circuit_breaker.failure_threshold, 2);
        assert_eq!(config.rate.circuit_breaker.open_timeout_ms, 30_000);
        assert_eq!(config.topology, GatewayPolicy::default());
        assert!(!config.simulation.topology.valid);
        assert_eq!(config.simulation.payments.record, Behavior::Unavailable);
        assert_eq!(config.simulation.payments.lookup, Behavior::Succeed);
        assert_eq!(config.transaction_types, vec![TransactionType::new(3, "REFUND", "Refund")]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ServiceConfig::load("does/not/exist.json").is_err());
    }
}
