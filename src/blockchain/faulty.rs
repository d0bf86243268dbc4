//! [`SimulatedChain`] wrapped with injected read failures.

use std::sync::atomic::{AtomicBool, Ordering};

use alloy::primitives::{Address, U256};

use crate::blockchain::gateway::ContractGateway;
use crate::blockchain::simulated::SimulatedChain;
use crate::blockchain::types::{
    ChainError, ChainResult, Participant, SessionFigures, SessionMeta, SessionStatus, Transaction,
    TxOutcome,
};

/// Delegates to the inner chain except where a fault is armed.
#[derive(Debug)]
pub struct FaultyChain {
    pub inner: SimulatedChain,
    /// Count and record reads time out once a transaction has been mined.
    fail_reads_after_submit: bool,
    reads_failing: AtomicBool,
    /// Session whose status getter returns an out-of-range code.
    unknown_status: Option<(Address, u8)>,
}

impl FaultyChain {
    pub fn new(inner: SimulatedChain) -> Self {
        Self {
            inner,
            fail_reads_after_submit: false,
            reads_failing: AtomicBool::new(false),
            unknown_status: None,
        }
    }

    pub fn fail_reads_after_submit(mut self) -> Self {
        self.fail_reads_after_submit = true;
        self
    }

    pub fn with_unknown_status(mut self, session: Address, code: u8) -> Self {
        self.unknown_status = Some((session, code));
        self
    }

    fn read(&self) -> ChainResult<()> {
        if self.reads_failing.load(Ordering::SeqCst) {
            return Err(ChainError::Timeout(10));
        }
        Ok(())
    }
}

impl ContractGateway for FaultyChain {
    async fn accounts(&self) -> ChainResult<Vec<Address>> {
        self.inner.accounts().await
    }

    async fn balance(&self, owner: Address) -> ChainResult<U256> {
        self.inner.balance(owner).await
    }

    async fn admin(&self) -> ChainResult<Address> {
        self.inner.admin().await
    }

    async fn participant(&self, account: Address) -> ChainResult<Participant> {
        self.read()?;
        self.inner.participant(account).await
    }

    async fn participant_count(&self) -> ChainResult<u64> {
        self.read()?;
        self.inner.participant_count().await
    }

    async fn participant_at(&self, index: u64) -> ChainResult<Address> {
        self.inner.participant_at(index).await
    }

    async fn session_count(&self) -> ChainResult<u64> {
        self.read()?;
        self.inner.session_count().await
    }

    async fn session_at(&self, index: u64) -> ChainResult<Address> {
        self.inner.session_at(index).await
    }

    async fn session_status(&self, session: Address) -> ChainResult<SessionStatus> {
        match self.unknown_status {
            Some((target, code)) if target == session => SessionStatus::try_from(code),
            _ => self.inner.session_status(session).await,
        }
    }

    async fn session_meta(&self, session: Address) -> ChainResult<SessionMeta> {
        self.inner.session_meta(session).await
    }

    async fn session_figures(&self, session: Address, viewer: Address) -> ChainResult<SessionFigures> {
        self.inner.session_figures(session, viewer).await
    }

    async fn simulate(&self, from: Address, tx: &Transaction) -> ChainResult<()> {
        self.inner.simulate(from, tx).await
    }

    async fn submit(&self, from: Address, tx: Transaction) -> ChainResult<TxOutcome> {
        let outcome = self.inner.submit(from, tx).await?;
        if self.fail_reads_after_submit {
            self.reads_failing.store(true, Ordering::SeqCst);
        }
        Ok(outcome)
    }
}
