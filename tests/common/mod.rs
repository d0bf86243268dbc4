//! Shared fixtures for controller integration tests.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use pricing_dapp::blockchain::{SessionCall, SessionMeta, SimulatedChain, Transaction};
use pricing_dapp::config::AppConfig;
use pricing_dapp::App;

/// Admin of every simulated chain built here.
pub fn admin() -> Address {
    Address::with_last_byte(1)
}

pub fn user(n: u8) -> Address {
    Address::with_last_byte(n + 1)
}

/// A chain with the admin and `users` members, each member registered as
/// `user<n>`.
pub fn registered_chain(users: u8) -> SimulatedChain {
    let chain = SimulatedChain::with_accounts(users + 1);
    for n in 1..=users {
        chain
            .seed(
                user(n),
                Transaction::Register {
                    fullname: format!("user{}", n),
                    email: format!("user{}@test.com", n),
                },
            )
            .unwrap();
    }
    chain
}

pub fn deploy(chain: &SimulatedChain, name: &str) -> Address {
    chain
        .seed(
            admin(),
            Transaction::DeploySession(SessionMeta {
                name: name.to_string(),
                description: format!("{} for pricing", name),
                image: format!("ipfs://{}", name.to_lowercase()),
            }),
        )
        .unwrap()
        .unwrap()
}

pub fn drive(chain: &SimulatedChain, from: Address, session: Address, call: SessionCall) {
    chain.seed(from, Transaction::Session { session, call }).unwrap();
}

#[allow(dead_code)]
pub fn price(chain: &SimulatedChain, from: Address, session: Address, value: u64) {
    drive(chain, from, session, SessionCall::Pricing(U256::from(value)));
}

/// Start the controller over `chain`, acting as `account`.
pub fn start_as(chain: SimulatedChain, account: Address) -> (Arc<SimulatedChain>, App<SimulatedChain>) {
    chain.switch_account(account);
    let chain = Arc::new(chain);
    let app = App::start(Arc::clone(&chain), &AppConfig::default());
    (chain, app)
}
