//! In-memory chain double.
//!
//! Mirrors the behavior pinned down by the contracts' own test suite so the
//! controller can be exercised without a node:
//! - the first account deploys Main and is its admin
//! - registration is one per address
//! - only the admin deploys, starts, stops and closes sessions
//! - only registered participants price, only while pricing, only above zero
//! - closing scores every pricer and folds the score into their running
//!   deviation; the admin can fold in a score directly

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::gateway::ContractGateway;
use crate::blockchain::types::{
    ChainError, ChainResult, Participant, SessionCall, SessionFigures, SessionMeta, SessionStatus,
    Transaction, TxOutcome,
};

/// Starting balance of every simulated account: 100 ETH.
const INITIAL_BALANCE_WEI: u128 = 100_000_000_000_000_000_000;

#[derive(Debug, Clone)]
struct SessionState {
    meta: SessionMeta,
    status: SessionStatus,
    proposed_price: U256,
    final_price: U256,
    /// Pricers in first-submission order with their latest price.
    prices: Vec<(Address, U256)>,
    /// Per-pricer deviation recorded at close.
    scores: HashMap<Address, u64>,
}

#[derive(Debug, Clone, Default)]
struct Ledger {
    accounts: Vec<Address>,
    balances: HashMap<Address, U256>,
    admin: Address,
    participants: HashMap<Address, Participant>,
    participant_index: Vec<Address>,
    sessions: Vec<Address>,
    session_state: HashMap<Address, SessionState>,
    tx_count: u64,
}

impl Ledger {
    fn execute(&mut self, from: Address, tx: &Transaction) -> ChainResult<Option<Address>> {
        self.tx_count += 1;
        match tx {
            Transaction::Register { fullname, email } => {
                if self.participants.contains_key(&from) {
                    return Err(ChainError::reverted("Participant already registered"));
                }
                self.participants.insert(
                    from,
                    Participant {
                        account: from,
                        fullname: fullname.clone(),
                        email: email.clone(),
                        n_sessions: 0,
                        deviation: 0,
                    },
                );
                self.participant_index.push(from);
                Ok(None)
            }
            Transaction::DeploySession(meta) => {
                if from != self.admin {
                    return Err(ChainError::reverted("Only admin can add sessions"));
                }
                let mut bytes = [0u8; 20];
                bytes[0] = 0x5e;
                bytes[12..].copy_from_slice(&(self.sessions.len() as u64 + 1).to_be_bytes());
                let address = Address::from(bytes);
                self.sessions.push(address);
                self.session_state.insert(
                    address,
                    SessionState {
                        meta: meta.clone(),
                        status: SessionStatus::Idle,
                        proposed_price: U256::ZERO,
                        final_price: U256::ZERO,
                        prices: Vec::new(),
                        scores: HashMap::new(),
                    },
                );
                Ok(Some(address))
            }
            Transaction::Session { session, call } => {
                self.execute_session(from, *session, *call)?;
                Ok(None)
            }
        }
    }

    fn execute_session(&mut self, from: Address, session: Address, call: SessionCall) -> ChainResult<()> {
        let is_admin = from == self.admin;
        let registered = self.participants.contains_key(&from);
        let state = self
            .session_state
            .get_mut(&session)
            .ok_or_else(|| ChainError::Rpc(format!("no contract at {}", session)))?;

        match call {
            SessionCall::Start => {
                if !is_admin {
                    return Err(ChainError::reverted("Only admin"));
                }
                match state.status {
                    SessionStatus::Idle | SessionStatus::Stopped => state.status = SessionStatus::Pricing,
                    SessionStatus::Pricing => return Err(ChainError::reverted("Session already started")),
                    SessionStatus::Closed => return Err(ChainError::reverted("Session closed")),
                }
            }
            SessionCall::Stop => {
                if !is_admin {
                    return Err(ChainError::reverted("Only admin"));
                }
                if state.status != SessionStatus::Pricing {
                    return Err(ChainError::reverted("Session is not running"));
                }
                state.status = SessionStatus::Stopped;
            }
            SessionCall::Pricing(price) => {
                if !registered {
                    return Err(ChainError::reverted("Only participants can price"));
                }
                if state.status != SessionStatus::Pricing {
                    return Err(ChainError::reverted("Session is not open for pricing"));
                }
                if price.is_zero() {
                    return Err(ChainError::reverted("Price must be greater than zero"));
                }
                match state.prices.iter_mut().find(|(who, _)| *who == from) {
                    Some(entry) => entry.1 = price,
                    None => state.prices.push((from, price)),
                }
                state.proposed_price = weighted_price(&state.prices, &self.participants);
            }
            SessionCall::Close(price) => {
                if !is_admin {
                    return Err(ChainError::reverted("Only admin"));
                }
                if !matches!(state.status, SessionStatus::Pricing | SessionStatus::Stopped) {
                    return Err(ChainError::reverted("Session cannot be closed"));
                }
                if price.is_zero() {
                    return Err(ChainError::reverted("Price must be greater than zero"));
                }
                state.status = SessionStatus::Closed;
                state.final_price = price;

                for (who, submitted) in &state.prices {
                    let gap = if price > *submitted { price - *submitted } else { *submitted - price };
                    let score: u64 = (gap * U256::from(100) / price).saturating_to();
                    state.scores.insert(*who, score);

                    if let Some(participant) = self.participants.get_mut(who) {
                        fold_score(participant, score);
                    }
                }
            }
        }
        Ok(())
    }

    fn update_participant(&mut self, from: Address, account: Address, score: u64) -> ChainResult<()> {
        if from != self.admin {
            return Err(ChainError::reverted("Only admin"));
        }
        let participant = self
            .participants
            .get_mut(&account)
            .ok_or_else(|| ChainError::reverted("Participant not registered"))?;
        fold_score(participant, score);
        Ok(())
    }

    fn session(&self, session: Address) -> ChainResult<&SessionState> {
        self.session_state
            .get(&session)
            .ok_or_else(|| ChainError::Rpc(format!("no contract at {}", session)))
    }
}

/// Fold one session's score into the running mean deviation.
fn fold_score(participant: &mut Participant, score: u64) {
    let total = participant.deviation * participant.n_sessions + score;
    participant.n_sessions += 1;
    participant.deviation = total / participant.n_sessions;
}

/// Mean of submitted prices weighted by each pricer's accuracy (100 - deviation).
fn weighted_price(prices: &[(Address, U256)], participants: &HashMap<Address, Participant>) -> U256 {
    if prices.is_empty() {
        return U256::ZERO;
    }
    let mut numerator = U256::ZERO;
    let mut denominator = U256::ZERO;
    for (who, price) in prices {
        let deviation = participants.get(who).map(|p| p.deviation.min(100)).unwrap_or(0);
        let weight = U256::from(100 - deviation);
        numerator += *price * weight;
        denominator += weight;
    }
    if denominator.is_zero() {
        let sum = prices.iter().fold(U256::ZERO, |acc, (_, price)| acc + *price);
        return sum / U256::from(prices.len());
    }
    numerator / denominator
}

/// In-memory implementation of [`ContractGateway`].
#[derive(Debug, Default)]
pub struct SimulatedChain {
    ledger: Mutex<Ledger>,
    submitted: AtomicUsize,
}

impl SimulatedChain {
    /// Create a chain with the given accounts; the first one is the admin.
    pub fn new(accounts: Vec<Address>) -> Self {
        let admin = accounts.first().copied().unwrap_or_default();
        let balances = accounts
            .iter()
            .map(|a| (*a, U256::from(INITIAL_BALANCE_WEI)))
            .collect();
        Self {
            ledger: Mutex::new(Ledger {
                accounts,
                balances,
                admin,
                ..Default::default()
            }),
            submitted: AtomicUsize::new(0),
        }
    }

    /// Create a chain with `n` deterministic accounts `0x..01`, `0x..02`, ...
    pub fn with_accounts(n: u8) -> Self {
        Self::new((1..=n).map(Address::with_last_byte).collect())
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All accounts in current order.
    pub fn account_list(&self) -> Vec<Address> {
        self.ledger().accounts.clone()
    }

    /// Make `account` the primary account, as a wallet switch would.
    pub fn switch_account(&self, account: Address) {
        let mut ledger = self.ledger();
        ledger.accounts.retain(|a| *a != account);
        ledger.accounts.insert(0, account);
    }

    /// Number of transactions sent through [`ContractGateway::submit`].
    pub fn submitted_transactions(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Execute a transaction directly, bypassing the counters.
    ///
    /// Seeds fixtures (registrations, sessions) before a test runs.
    pub fn seed(&self, from: Address, tx: Transaction) -> ChainResult<Option<Address>> {
        self.ledger().execute(from, &tx)
    }

    /// Admin-only score adjustment, folded like a closed session's score.
    ///
    /// Not part of [`ContractGateway`]; used to seed participant history.
    pub fn update_participant(&self, from: Address, account: Address, score: u64) -> ChainResult<()> {
        self.ledger().update_participant(from, account, score)
    }

    /// Deviation recorded for `who` when `session` closed.
    pub fn session_score(&self, session: Address, who: Address) -> Option<u64> {
        self.ledger()
            .session_state
            .get(&session)
            .and_then(|s| s.scores.get(&who).copied())
    }
}

impl ContractGateway for SimulatedChain {
    async fn accounts(&self) -> ChainResult<Vec<Address>> {
        Ok(self.account_list())
    }

    async fn balance(&self, owner: Address) -> ChainResult<U256> {
        Ok(self.ledger().balances.get(&owner).copied().unwrap_or_default())
    }

    async fn admin(&self) -> ChainResult<Address> {
        Ok(self.ledger().admin)
    }

    async fn participant(&self, account: Address) -> ChainResult<Participant> {
        Ok(self.ledger().participants.get(&account).cloned().unwrap_or_default())
    }

    async fn participant_count(&self) -> ChainResult<u64> {
        Ok(self.ledger().participant_index.len() as u64)
    }

    async fn participant_at(&self, index: u64) -> ChainResult<Address> {
        self.ledger()
            .participant_index
            .get(index as usize)
            .copied()
            .ok_or_else(|| ChainError::reverted("index out of bounds"))
    }

    async fn session_count(&self) -> ChainResult<u64> {
        Ok(self.ledger().sessions.len() as u64)
    }

    async fn session_at(&self, index: u64) -> ChainResult<Address> {
        self.ledger()
            .sessions
            .get(index as usize)
            .copied()
            .ok_or_else(|| ChainError::reverted("index out of bounds"))
    }

    async fn session_status(&self, session: Address) -> ChainResult<SessionStatus> {
        self.ledger().session(session).map(|s| s.status)
    }

    async fn session_meta(&self, session: Address) -> ChainResult<SessionMeta> {
        self.ledger().session(session).map(|s| s.meta.clone())
    }

    async fn session_figures(&self, session: Address, viewer: Address) -> ChainResult<SessionFigures> {
        let ledger = self.ledger();
        let state = ledger.session(session)?;
        let viewer_price = state
            .prices
            .iter()
            .find(|(who, _)| *who == viewer)
            .map(|(_, price)| *price)
            .unwrap_or_default();
        Ok(SessionFigures {
            proposed_price: state.proposed_price,
            final_price: state.final_price,
            viewer_price,
        })
    }

    async fn simulate(&self, from: Address, tx: &Transaction) -> ChainResult<()> {
        let mut scratch = self.ledger().clone();
        scratch.execute(from, tx).map(|_| ())
    }

    async fn submit(&self, from: Address, tx: Transaction) -> ChainResult<TxOutcome> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        let mut ledger = self.ledger();
        let contract_address = ledger.execute(from, &tx)?;
        let tx_hash = TxHash::from(U256::from(ledger.tx_count).to_be_bytes::<32>());
        Ok(TxOutcome {
            tx_hash,
            contract_address,
        })
    }
}
