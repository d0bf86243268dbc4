//! Preflight-then-send for every state-changing call.

use alloy::primitives::Address;

use crate::blockchain::{ChainResult, ContractGateway, SessionCall, SessionStatus, Transaction, TxOutcome};
use crate::observability::metrics;

/// A mined session transaction and the status it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub previous: SessionStatus,
    pub outcome: TxOutcome,
}

/// Dry-run `tx`, then send it if the contract would accept it.
///
/// A revert during the dry run is returned as is and nothing is sent.
pub async fn submit_checked<G: ContractGateway>(
    gateway: &G,
    from: Address,
    tx: Transaction,
) -> ChainResult<TxOutcome> {
    let kind = tx.kind();

    if let Err(e) = gateway.simulate(from, &tx).await {
        if e.is_revert() {
            tracing::info!(kind, %from, reason = %e, "Transaction rejected by contract");
            metrics::record_transaction(kind, "rejected");
        } else {
            tracing::error!(kind, %from, error = %e, "Transaction preflight failed");
            metrics::record_transaction(kind, "failed");
        }
        return Err(e);
    }

    match gateway.submit(from, tx).await {
        Ok(outcome) => {
            tracing::info!(kind, %from, tx_hash = %outcome.tx_hash, "Transaction mined");
            metrics::record_transaction(kind, "sent");
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!(kind, %from, error = %e, "Transaction failed after preflight");
            metrics::record_transaction(kind, "failed");
            Err(e)
        }
    }
}

/// Drive one transition on `session`.
pub async fn dispatch_session<G: ContractGateway>(
    gateway: &G,
    from: Address,
    session: Address,
    call: SessionCall,
) -> ChainResult<Dispatched> {
    let previous = gateway.session_status(session).await?;
    tracing::debug!(%session, action = call.name(), status = %previous, "Dispatching session action");

    let outcome = submit_checked(gateway, from, Transaction::Session { session, call }).await?;
    Ok(Dispatched { previous, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{ChainError, SessionMeta, SimulatedChain};
    use alloy::primitives::U256;

    fn setup() -> (SimulatedChain, Address) {
        let chain = SimulatedChain::with_accounts(2);
        let session = chain
            .seed(
                Address::with_last_byte(1),
                Transaction::DeploySession(SessionMeta {
                    name: "Tablet".to_string(),
                    ..Default::default()
                }),
            )
            .unwrap()
            .unwrap();
        (chain, session)
    }

    #[tokio::test]
    async fn test_rejected_preflight_sends_nothing() {
        let (chain, session) = setup();
        let err = dispatch_session(&chain, Address::with_last_byte(2), session, SessionCall::Start)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ChainError::Reverted {
                reason: "Only admin".to_string()
            }
        );
        assert_eq!(chain.submitted_transactions(), 0);
    }

    #[tokio::test]
    async fn test_accepted_call_is_sent() {
        let (chain, session) = setup();
        let dispatched = dispatch_session(&chain, Address::with_last_byte(1), session, SessionCall::Start)
            .await
            .unwrap();

        assert_eq!(dispatched.previous, SessionStatus::Idle);
        assert_eq!(chain.submitted_transactions(), 1);
        assert_eq!(chain.session_status(session).await.unwrap(), SessionStatus::Pricing);
    }

    #[tokio::test]
    async fn test_unknown_session_fails_before_preflight() {
        let (chain, _) = setup();
        let result = dispatch_session(
            &chain,
            Address::with_last_byte(1),
            Address::repeat_byte(0xee),
            SessionCall::Close(U256::from(1)),
        )
        .await;
        assert!(matches!(result, Err(ChainError::Rpc(_))));
        assert_eq!(chain.submitted_transactions(), 0);
    }
}
