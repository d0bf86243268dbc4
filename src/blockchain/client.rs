//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint, signing with an injected wallet when
//!   one is available and with node-managed accounts otherwise
//! - Query chain state (accounts, balances, chain id) with failover
//! - Bound every call with the configured timeout

use std::future::Future;
use std::time::{Duration, Instant};

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::TransportResult;
use tokio::time::timeout;

use crate::blockchain::types::{ChainError, ChainId, ChainResult};
use crate::blockchain::wallet::Wallet;
use crate::config::ProviderConfig;
use crate::observability::metrics;

/// Where signing accounts come from.
#[derive(Debug, Clone)]
pub enum AccountSource {
    /// A local key from the environment; its address is the only account.
    Injected(Wallet),
    /// Accounts unlocked on the node (`eth_accounts`), signed node-side.
    Node,
}

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: ProviderConfig,
    /// Where accounts come from.
    accounts: AccountSource,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new blockchain client.
    ///
    /// Fails only on a malformed primary URL; an unreachable node surfaces
    /// later as per-call errors.
    pub async fn new(config: ProviderConfig, wallet: Option<Wallet>) -> ChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(connect(primary_url, wallet.as_ref()));

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(connect(url, wallet.as_ref()));
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let accounts = match wallet {
            Some(wallet) => AccountSource::Injected(wallet),
            None => AccountSource::Node,
        };

        let client = Self {
            providers,
            config: config.clone(),
            accounts,
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    injected_wallet = client.is_injected(),
                    "Blockchain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration, if one is configured.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let Some(expected) = self.config.chain_id else {
            return Ok(());
        };
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != expected {
            return Err(ChainError::ChainMismatch {
                expected,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> ChainResult<ChainId> {
        self.read_with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Accounts available for signing, primary first.
    pub async fn get_accounts(&self) -> ChainResult<Vec<Address>> {
        match &self.accounts {
            AccountSource::Injected(wallet) => Ok(vec![wallet.address()]),
            AccountSource::Node => {
                self.read_with_failover("eth_accounts", |p| async move { p.get_accounts().await })
                    .await
            }
        }
    }

    /// Get the balance of an address.
    pub async fn get_balance(&self, address: Address) -> ChainResult<U256> {
        self.read_with_failover("eth_getBalance", move |p| async move {
            p.get_balance(address).await
        })
        .await
    }

    /// Run a read against each provider in order until one answers.
    async fn read_with_failover<T, F, Fut>(&self, method: &'static str, call: F) -> ChainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            let started = Instant::now();
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => {
                    metrics::record_rpc_call(method, true, started.elapsed());
                    return Ok(result);
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                }
            }
            metrics::record_rpc_call(method, false, started.elapsed());
        }
        Err(ChainError::Rpc(format!("All RPC providers failed for {}", method)))
    }

    /// Bound a call against the primary provider with the RPC timeout.
    pub async fn timed<T>(
        &self,
        method: &'static str,
        fut: impl Future<Output = ChainResult<T>>,
    ) -> ChainResult<T> {
        let started = Instant::now();
        let result = match timeout(self.timeout_duration, fut).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout(self.config.rpc_timeout_secs)),
        };
        metrics::record_rpc_call(method, result.is_ok(), started.elapsed());
        if let Err(e) = &result {
            tracing::debug!(method, error = %e, "Contract call failed");
        }
        result
    }

    /// Get the underlying primary provider.
    pub fn provider(&self) -> &DynProvider {
        &self.providers[0]
    }

    /// Whether transactions are signed by an injected wallet.
    pub fn is_injected(&self) -> bool {
        matches!(self.accounts, AccountSource::Injected(_))
    }

}

fn connect(url: url::Url, wallet: Option<&Wallet>) -> DynProvider {
    match wallet {
        Some(wallet) => ProviderBuilder::new()
            .wallet(wallet.network_wallet())
            .connect_http(url)
            .erased(),
        None => ProviderBuilder::new().connect_http(url).erased(),
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("providers", &self.providers.len())
            .field("injected_wallet", &self.is_injected())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
