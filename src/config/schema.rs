//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Fallback endpoint used when no wallet key is injected.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:7545";

/// Root configuration for the pricing client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// RPC endpoint and account settings.
    pub provider: ProviderConfig,

    /// Deployed contract locations.
    pub contracts: ContractsConfig,

    /// Listing workflow tuning.
    pub listing: ListingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order for chain reads.
    pub failover_urls: Vec<String>,

    /// Expected chain ID. Verified at startup when set.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// How often the account watcher polls for account changes.
    pub account_poll_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            failover_urls: Vec::new(),
            chain_id: None,
            rpc_timeout_secs: 10,
            account_poll_secs: 2,
        }
    }
}

/// Contract addresses and build artifacts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Address of the deployed Main contract.
    pub main_address: String,

    /// Truffle build artifact of the Session contract (provides bytecode).
    pub session_artifact: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            main_address: String::new(),
            session_artifact: "build/contracts/Session.json".to_string(),
        }
    }
}

/// Listing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Maximum number of contract reads in flight per listing.
    pub max_concurrent_reads: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_reads: 8,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
