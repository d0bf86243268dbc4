//! RPC-backed [`ContractGateway`] over the Main and Session contracts.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::{decode_revert_reason, SolCall, SolConstructor};
use alloy::transports::TransportError;
use dashmap::DashMap;

use crate::blockchain::client::ChainClient;
use crate::blockchain::gateway::ContractGateway;
use crate::blockchain::types::{
    ChainError, ChainResult, Participant, SessionCall, SessionFigures, SessionMeta, SessionStatus,
    Transaction, TxOutcome,
};

sol! {
    /// Registry of participants and sessions.
    #[sol(rpc)]
    contract Main {
        function admin() external view returns (address);
        function participants(address who) external view returns (
            address account,
            string fullname,
            string email,
            uint256 nSessions,
            uint256 deviation
        );
        function nParticipants() external view returns (uint256);
        function iParticipants(uint256 index) external view returns (address);
        function register(string fullname, string email) external;
        function nSessions() external view returns (uint256);
        function sessions(uint256 index) external view returns (address);
    }

    /// One product's pricing session.
    #[sol(rpc)]
    contract Session {
        constructor(address mainContract, string name, string description, string image);

        function name() external view returns (string);
        function description() external view returns (string);
        function image() external view returns (string);
        function status() external view returns (uint8);
        function proposedPrice() external view returns (uint256);
        function finalPrice() external view returns (uint256);
        function participants(address who) external view returns (
            address account,
            uint256 price,
            uint256 deviation
        );
        function startSession() external;
        function stopSession() external;
        function pricingSession(uint256 price) external;
        function closeSession(uint256 price) external;
    }
}

/// Gateway talking to deployed contracts through a [`ChainClient`].
#[derive(Clone)]
pub struct PricingContracts {
    client: ChainClient,
    main_address: Address,
    /// Session creation code; deployment fails without it.
    session_bytecode: Option<Bytes>,
    /// Session name/description/image never change after deployment.
    meta_cache: Arc<DashMap<Address, SessionMeta>>,
}

impl PricingContracts {
    pub fn new(client: ChainClient, main_address: Address, session_bytecode: Option<Bytes>) -> Self {
        Self {
            client,
            main_address,
            session_bytecode,
            meta_cache: Arc::new(DashMap::new()),
        }
    }

    fn main(&self) -> Main::MainInstance<alloy::providers::DynProvider> {
        Main::new(self.main_address, self.client.provider().clone())
    }

    fn session(&self, address: Address) -> Session::SessionInstance<alloy::providers::DynProvider> {
        Session::new(address, self.client.provider().clone())
    }

    /// Encode `tx` as a request from `from`.
    fn request(&self, from: Address, tx: &Transaction) -> ChainResult<TransactionRequest> {
        let request = TransactionRequest::default().with_from(from);
        let request = match tx {
            Transaction::Register { fullname, email } => {
                let input = Main::registerCall {
                    fullname: fullname.clone(),
                    email: email.clone(),
                }
                .abi_encode();
                request.with_to(self.main_address).with_input(input)
            }
            Transaction::DeploySession(meta) => {
                let bytecode = self.session_bytecode.as_ref().ok_or_else(|| {
                    ChainError::Artifact("Session bytecode not loaded; cannot deploy".to_string())
                })?;
                let args = Session::constructorCall {
                    mainContract: self.main_address,
                    name: meta.name.clone(),
                    description: meta.description.clone(),
                    image: meta.image.clone(),
                }
                .abi_encode();
                let mut code = bytecode.to_vec();
                code.extend_from_slice(&args);
                request.with_deploy_code(code)
            }
            Transaction::Session { session, call } => {
                let input = match *call {
                    SessionCall::Start => Session::startSessionCall {}.abi_encode(),
                    SessionCall::Stop => Session::stopSessionCall {}.abi_encode(),
                    SessionCall::Pricing(price) => Session::pricingSessionCall { price }.abi_encode(),
                    SessionCall::Close(price) => Session::closeSessionCall { price }.abi_encode(),
                };
                request.with_to(*session).with_input(input)
            }
        };
        Ok(request)
    }
}

impl ContractGateway for PricingContracts {
    async fn accounts(&self) -> ChainResult<Vec<Address>> {
        self.client.get_accounts().await
    }

    async fn balance(&self, owner: Address) -> ChainResult<U256> {
        self.client.get_balance(owner).await
    }

    async fn admin(&self) -> ChainResult<Address> {
        let main = self.main();
        self.client
            .timed("Main.admin", async { main.admin().call().await.map_err(read_error) })
            .await
    }

    async fn participant(&self, account: Address) -> ChainResult<Participant> {
        let main = self.main();
        let record = self
            .client
            .timed("Main.participants", async {
                main.participants(account).call().await.map_err(read_error)
            })
            .await?;
        Ok(Participant {
            account: record.account,
            fullname: record.fullname,
            email: record.email,
            n_sessions: record.nSessions.saturating_to(),
            deviation: record.deviation.saturating_to(),
        })
    }

    async fn participant_count(&self) -> ChainResult<u64> {
        let main = self.main();
        let count = self
            .client
            .timed("Main.nParticipants", async {
                main.nParticipants().call().await.map_err(read_error)
            })
            .await?;
        to_count(count)
    }

    async fn participant_at(&self, index: u64) -> ChainResult<Address> {
        let main = self.main();
        self.client
            .timed("Main.iParticipants", async {
                main.iParticipants(U256::from(index)).call().await.map_err(read_error)
            })
            .await
    }

    async fn session_count(&self) -> ChainResult<u64> {
        let main = self.main();
        let count = self
            .client
            .timed("Main.nSessions", async {
                main.nSessions().call().await.map_err(read_error)
            })
            .await?;
        to_count(count)
    }

    async fn session_at(&self, index: u64) -> ChainResult<Address> {
        let main = self.main();
        self.client
            .timed("Main.sessions", async {
                main.sessions(U256::from(index)).call().await.map_err(read_error)
            })
            .await
    }

    async fn session_status(&self, session: Address) -> ChainResult<SessionStatus> {
        let contract = self.session(session);
        let code = self
            .client
            .timed("Session.status", async {
                contract.status().call().await.map_err(read_error)
            })
            .await?;
        SessionStatus::try_from(code)
    }

    async fn session_meta(&self, session: Address) -> ChainResult<SessionMeta> {
        if let Some(meta) = self.meta_cache.get(&session) {
            return Ok(meta.value().clone());
        }

        let contract = self.session(session);
        let (name, description, image) = self
            .client
            .timed("Session.meta", async {
                tokio::try_join!(
                    async { contract.name().call().await.map_err(read_error) },
                    async { contract.description().call().await.map_err(read_error) },
                    async { contract.image().call().await.map_err(read_error) },
                )
            })
            .await?;

        let meta = SessionMeta {
            name,
            description,
            image,
        };
        self.meta_cache.insert(session, meta.clone());
        Ok(meta)
    }

    async fn session_figures(&self, session: Address, viewer: Address) -> ChainResult<SessionFigures> {
        let contract = self.session(session);
        let (proposed_price, final_price, mine) = self
            .client
            .timed("Session.figures", async {
                tokio::try_join!(
                    async { contract.proposedPrice().call().await.map_err(read_error) },
                    async { contract.finalPrice().call().await.map_err(read_error) },
                    async { contract.participants(viewer).call().await.map_err(read_error) },
                )
            })
            .await?;

        Ok(SessionFigures {
            proposed_price,
            final_price,
            viewer_price: mine.price,
        })
    }

    async fn simulate(&self, from: Address, tx: &Transaction) -> ChainResult<()> {
        let request = self.request(from, tx)?;
        let provider = self.client.provider().clone();
        self.client
            .timed("eth_call", async move {
                provider.call(request).await.map(|_| ()).map_err(transport_error)
            })
            .await
    }

    async fn submit(&self, from: Address, tx: Transaction) -> ChainResult<TxOutcome> {
        let request = self.request(from, &tx)?;
        let provider = self.client.provider().clone();

        let pending = self
            .client
            .timed("eth_sendTransaction", async {
                provider.send_transaction(request).await.map_err(transport_error)
            })
            .await?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(%tx_hash, kind = tx.kind(), "Transaction sent");

        // Mining time is outside the RPC timeout; a stalled node stalls here.
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(format!("receipt for {}: {}", tx_hash, e)))?;

        if !receipt.status() {
            return Err(ChainError::reverted(format!("transaction {} reverted on-chain", tx_hash)));
        }

        if matches!(tx, Transaction::DeploySession(_)) && receipt.contract_address.is_none() {
            return Err(ChainError::MissingContractAddress(tx_hash));
        }

        Ok(TxOutcome {
            tx_hash,
            contract_address: receipt.contract_address,
        })
    }
}

fn to_count(value: U256) -> ChainResult<u64> {
    u64::try_from(value).map_err(|_| ChainError::Rpc(format!("count {} out of range", value)))
}

fn read_error(err: alloy::contract::Error) -> ChainError {
    ChainError::Rpc(err.to_string())
}

/// Map a node error, keeping the contract's revert reason when there is one.
fn transport_error(err: TransportError) -> ChainError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(data) = payload.as_revert_data() {
            if let Some(reason) = decode_revert_reason(&data) {
                return ChainError::reverted(reason);
            }
        }
        if payload.message.contains("revert") {
            return ChainError::reverted(&*payload.message);
        }
    }
    ChainError::Rpc(err.to_string())
}
