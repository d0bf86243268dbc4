//! Parsing user actions and the refresh policy that follows them.

use alloy::primitives::U256;

use crate::blockchain::SessionCall;

/// What the controller does after a session transaction is mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Statuses changed: re-list products.
    RefreshProducts,
    /// Only the caller's own price changed: tell them it went through.
    ConfirmPrice,
    /// Final price set and deviations rescored: re-list products, then participants.
    RefreshProductsAndParticipants,
}

impl FollowUp {
    pub fn for_call(call: &SessionCall) -> Self {
        match call {
            SessionCall::Start | SessionCall::Stop => Self::RefreshProducts,
            SessionCall::Pricing(_) => Self::ConfirmPrice,
            SessionCall::Close(_) => Self::RefreshProductsAndParticipants,
        }
    }
}

/// Parse an action name (`start`, `stop`, `pricing`, `close`) and its price.
///
/// A missing price is zero; whether zero is acceptable is the contract's call.
pub fn parse_action(name: &str, price: Option<&str>) -> Result<SessionCall, String> {
    let price = match price {
        Some(raw) => raw
            .trim()
            .parse::<U256>()
            .map_err(|e| format!("invalid price '{}': {}", raw, e))?,
        None => U256::ZERO,
    };

    match name.to_ascii_lowercase().as_str() {
        "start" => Ok(SessionCall::Start),
        "stop" => Ok(SessionCall::Stop),
        "pricing" | "price" => Ok(SessionCall::Pricing(price)),
        "close" => Ok(SessionCall::Close(price)),
        other => Err(format!("unknown session action '{}'", other)),
    }
}
