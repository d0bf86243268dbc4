use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};

const AVATAR_BASE_URL: &str = "https://robohash.org/";

pub fn avatar_url(account: Address) -> String {
    format!("{}{}", AVATAR_BASE_URL, account)
}

/// Wei as ETH without trailing zeros, e.g. `100` or `99.5`.
pub fn eth(wei: U256) -> String {
    trim_fraction(format_ether(wei))
}

/// Deviation score as a percentage: the score is in hundredths.
pub fn accuracy(deviation: u64) -> String {
    let whole = deviation / 100;
    let fraction = deviation % 100;
    if fraction == 0 {
        format!("{}%", whole)
    } else {
        format!("{}%", trim_fraction(format!("{}.{:02}", whole, fraction)))
    }
}

fn trim_fraction(value: String) -> String {
    if !value.contains('.') {
        return value;
    }
    value.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eth_formatting() {
        assert_eq!(eth(U256::from(100_000_000_000_000_000_000u128)), "100");
        assert_eq!(eth(U256::from(1_500_000_000_000_000_000u128)), "1.5");
        assert_eq!(eth(U256::ZERO), "0");
    }

    #[test]
    fn test_accuracy_formatting() {
        assert_eq!(accuracy(0), "0%");
        assert_eq!(accuracy(15), "0.15%");
        assert_eq!(accuracy(150), "1.5%");
        assert_eq!(accuracy(1500), "15%");
    }

    #[test]
    fn test_avatar_url() {
        let url = avatar_url(Address::with_last_byte(1));
        assert_eq!(url, "https://robohash.org/0x0000000000000000000000000000000000000001");
    }
}
