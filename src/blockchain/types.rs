//! Chain-side types and error definitions.

use alloy::primitives::{Address, TxHash, U256};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The contract rejected the call.
    #[error("Transaction reverted: {reason}")]
    Reverted { reason: String },

    /// Invalid private key format or signer error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// The contract reported a session status outside the known set.
    #[error("Unknown session status code {0}")]
    UnknownStatus(u8),

    /// Contract build artifact could not be used.
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// A configured contract address did not parse.
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// A deployment receipt did not carry a contract address.
    #[error("Deployment of {0} returned no contract address")]
    MissingContractAddress(TxHash),
}

impl ChainError {
    /// Build a revert error, stripping the node's "execution reverted" prefix.
    pub fn reverted(reason: impl AsRef<str>) -> Self {
        let reason = reason.as_ref();
        let reason = reason
            .split_once("execution reverted:")
            .map(|(_, rest)| rest)
            .unwrap_or(reason)
            .trim();
        Self::Reverted {
            reason: reason.to_string(),
        }
    }

    /// Whether this error is an authoritative contract rejection.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }
}

/// Result type for blockchain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Lifecycle status of a Session contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Idle,
    Stopped,
    Pricing,
    Closed,
}

impl SessionStatus {
    /// Display label shown in product listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "START",
            Self::Stopped => "STOP",
            Self::Pricing => "PRICING",
            Self::Closed => "CLOSE",
        }
    }

    /// Whether non-admin viewers may see a session in this status.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Pricing | Self::Closed)
    }
}

impl TryFrom<u8> for SessionStatus {
    type Error = ChainError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Idle),
            1 => Ok(Self::Stopped),
            2 => Ok(Self::Pricing),
            3 => Ok(Self::Closed),
            other => Err(ChainError::UnknownStatus(other)),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A participant record as stored by the Main contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participant {
    /// Zero for addresses that never registered.
    pub account: Address,
    pub fullname: String,
    pub email: String,
    /// Number of closed sessions the participant was scored in.
    pub n_sessions: u64,
    /// Running deviation score.
    pub deviation: u64,
}

impl Participant {
    pub fn is_registered(&self) -> bool {
        self.account != Address::ZERO
    }
}

/// Fields of a Session fixed at deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMeta {
    pub name: String,
    pub description: String,
    pub image: String,
}

/// Price figures of a Session as seen by one viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFigures {
    pub proposed_price: U256,
    pub final_price: U256,
    /// Price the viewer submitted, zero if none.
    pub viewer_price: U256,
}

/// State-changing Session calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCall {
    Start,
    Stop,
    Pricing(U256),
    Close(U256),
}

impl SessionCall {
    /// Name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Pricing(_) => "pricing",
            Self::Close(_) => "close",
        }
    }
}

/// A transaction the client can preflight and submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// `Main.register(fullname, email)`.
    Register { fullname: String, email: String },
    /// Deploy a new Session contract bound to the Main contract.
    DeploySession(SessionMeta),
    /// A call on an existing Session contract.
    Session { session: Address, call: SessionCall },
}

impl Transaction {
    /// Name used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::DeploySession(_) => "deploy_session",
            Self::Session { call, .. } => call.name(),
        }
    }
}

/// Result of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    /// Set for deployments.
    pub contract_address: Option<Address>,
}
