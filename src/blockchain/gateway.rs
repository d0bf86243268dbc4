//! The contract surface the controller talks to.
//!
//! Everything the client knows about the Main and Session contracts goes
//! through [`ContractGateway`]. The RPC-backed implementation lives in
//! `contracts.rs`; `simulated.rs` provides an in-memory double.

use std::future::Future;

use alloy::primitives::{Address, U256};

use crate::blockchain::types::{
    ChainResult, Participant, SessionFigures, SessionMeta, SessionStatus, Transaction, TxOutcome,
};

/// Read and write access to the pricing contracts.
///
/// Reads map one-to-one onto contract getters. Writes are split into
/// [`simulate`](Self::simulate), a read-only dry run that surfaces the
/// contract's revert reason, and [`submit`](Self::submit), which sends the
/// transaction and waits for its receipt.
pub trait ContractGateway: Send + Sync + 'static {
    /// Accounts available for signing, primary first.
    fn accounts(&self) -> impl Future<Output = ChainResult<Vec<Address>>> + Send;

    /// Native balance in wei.
    fn balance(&self, owner: Address) -> impl Future<Output = ChainResult<U256>> + Send;

    /// Administrator of the Main contract.
    fn admin(&self) -> impl Future<Output = ChainResult<Address>> + Send;

    /// Participant record for `account` (zeroed when unregistered).
    fn participant(&self, account: Address) -> impl Future<Output = ChainResult<Participant>> + Send;

    fn participant_count(&self) -> impl Future<Output = ChainResult<u64>> + Send;

    fn participant_at(&self, index: u64) -> impl Future<Output = ChainResult<Address>> + Send;

    fn session_count(&self) -> impl Future<Output = ChainResult<u64>> + Send;

    fn session_at(&self, index: u64) -> impl Future<Output = ChainResult<Address>> + Send;

    fn session_status(&self, session: Address) -> impl Future<Output = ChainResult<SessionStatus>> + Send;

    fn session_meta(&self, session: Address) -> impl Future<Output = ChainResult<SessionMeta>> + Send;

    fn session_figures(
        &self,
        session: Address,
        viewer: Address,
    ) -> impl Future<Output = ChainResult<SessionFigures>> + Send;

    /// Dry-run `tx` from `from`; `Err(ChainError::Reverted)` when the
    /// contract would reject it.
    fn simulate(&self, from: Address, tx: &Transaction) -> impl Future<Output = ChainResult<()>> + Send;

    /// Send `tx` from `from` and wait for it to be mined.
    fn submit(&self, from: Address, tx: Transaction) -> impl Future<Output = ChainResult<TxOutcome>> + Send;
}
