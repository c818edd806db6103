//! Input validation for URLs, addresses and the two user forms
//!
//! Everything here runs before any wallet call; failures are reported per
//! field through [`FieldErrors`].

use std::str::FromStr;

use alloy_primitives::{utils::parse_ether, Address};
use url::Url;

use crate::constants::{limits, messages};
use crate::error::FieldErrors;
use crate::types::{ChainDescriptor, NativeCurrency, NewNetworkPayload, Transfer, TransferPayload};
use crate::util_text::parse_chain_id;

/// Accepted URL schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schemes<'a> {
    Any,
    Exact(&'a str),
    OneOf(&'a [&'a str]),
}

/// Absolute, parseable URL whose scheme satisfies `schemes`.
///
/// An empty `OneOf` list behaves like `Any`.
pub fn is_valid_url(s: &str, schemes: Schemes<'_>) -> bool {
    if s.is_empty() {
        return false;
    }
    let Ok(url) = Url::parse(s) else {
        return false;
    };
    let scheme = url.scheme();
    match schemes {
        Schemes::Any => true,
        Schemes::OneOf([]) => true,
        Schemes::OneOf(list) => list.contains(&scheme),
        Schemes::Exact(expected) => scheme == expected,
    }
}

/// RPC endpoints must be `http` or `https`.
pub fn is_valid_rpc_url(s: &str) -> bool {
    is_valid_url(s, Schemes::OneOf(&["http", "https"]))
}

/// `0x` + 40 hex digits; mixed-case input must carry a valid EIP-55 checksum.
pub fn is_valid_address(s: &str) -> bool {
    parse_address(s).is_some()
}

fn parse_address(s: &str) -> Option<Address> {
    let s = s.trim();
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if hex.len() != 40 {
        return None;
    }
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(s, None).ok()
    } else {
        Address::from_str(s).ok()
    }
}

/// Digits with at most one decimal point, at least one digit overall.
fn is_plain_decimal(s: &str) -> bool {
    let mut dots = 0;
    let mut digits = 0;
    for c in s.chars() {
        match c {
            '.' => dots += 1,
            '0'..='9' => digits += 1,
            _ => return false,
        }
    }
    dots <= 1 && digits > 0
}

/// Validate the transfer form. `network` may be empty (use the wallet's chain).
pub fn validate_transfer(payload: &TransferPayload) -> Result<Transfer, FieldErrors> {
    let mut errors = FieldErrors::new();

    let chain_id = if payload.network.trim().is_empty() {
        None
    } else {
        let parsed = parse_chain_id(&payload.network);
        if parsed.is_none() {
            errors.insert("network", "Network is required");
        }
        parsed
    };

    let to = if payload.to.trim().is_empty() {
        errors.insert("to", "Please enter recipient's address");
        None
    } else {
        let parsed = parse_address(&payload.to);
        if parsed.is_none() {
            errors.insert("to", messages::ADDRESS_FORMAT);
        }
        parsed
    };

    let amount = payload.amount.trim();
    let value = if amount.is_empty() {
        errors.insert("amount", "Amount is required");
        None
    } else {
        // parse_ether accepts a sign; negative amounts must not wrap into U256
        let plain = is_plain_decimal(amount);
        match parse_ether(amount) {
            Ok(v) if plain => Some(v),
            _ => {
                errors.insert("amount", "Amount must be a non-negative number");
                None
            }
        }
    };

    let nonce = if payload.nonce.trim().is_empty() {
        errors.insert("nonce", "Nonce is required");
        None
    } else {
        let parsed = payload.nonce.trim().parse::<u64>().ok();
        if parsed.is_none() {
            errors.insert("nonce", "Nonce must be a non-negative integer");
        }
        parsed
    };

    match (to, value, nonce) {
        (Some(to), Some(value), Some(nonce)) if errors.is_empty() => Ok(Transfer {
            chain_id,
            to,
            value,
            nonce,
        }),
        _ => Err(errors),
    }
}

/// Validate the add-network form and build the descriptor it describes.
pub fn validate_new_network(payload: &NewNetworkPayload) -> Result<ChainDescriptor, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = payload.name.trim();
    let name_len = name.chars().count();
    if name.is_empty() {
        errors.insert("name", "Please enter network name");
    } else if name_len < limits::NAME_MIN_CHARS {
        errors.insert("name", "At least one character.");
    } else if name_len > limits::NAME_MAX_CHARS {
        errors.insert("name", "Should be less than 30 characters.");
    }

    let rpc_url = payload.rpc_url.trim();
    if rpc_url.is_empty() {
        errors.insert("rpcUrl", "Please enter RPC URL");
    } else if !is_valid_rpc_url(rpc_url) {
        errors.insert("rpcUrl", "Please enter a valid RPC URL.");
    }

    let chain_id = payload.chain_id.trim();
    let parsed_chain_id = if chain_id.is_empty() {
        errors.insert("chainId", "Please enter Chain ID");
        None
    } else if chain_id.starts_with('-') {
        errors.insert("chainId", "Chain ID should be greater than zero.");
        None
    } else {
        let parsed = parse_chain_id(chain_id);
        if parsed.is_none() {
            if chain_id.chars().all(|c| c.is_ascii_digit()) {
                errors.insert("chainId", "Chain ID is too large.");
            } else {
                errors.insert("chainId", "Chain ID must be a number.");
            }
        }
        parsed
    };

    let symbol = payload.currency_symbol.trim();
    let symbol_len = symbol.chars().count();
    if symbol.is_empty() {
        errors.insert("currencySymbol", "Please enter currency symbol");
    } else if !(limits::SYMBOL_MIN_CHARS..=limits::SYMBOL_MAX_CHARS).contains(&symbol_len) {
        errors.insert("currencySymbol", messages::CURRENCY_SYMBOL);
    }

    let decimals = payload.currency_decimals.trim();
    let parsed_decimals = if decimals.is_empty() {
        errors.insert("currencyDecimals", "Please enter currency decimals");
        None
    } else {
        match decimals.parse::<u32>() {
            Ok(d) if d < limits::DECIMALS_MIN => {
                errors.insert("currencyDecimals", "Should be at least 1");
                None
            }
            Ok(d) if d > limits::DECIMALS_MAX => {
                errors.insert("currencyDecimals", "Should be at most 100");
                None
            }
            Ok(d) => u8::try_from(d).ok(),
            Err(_) => {
                errors.insert("currencyDecimals", "Currency decimals must be a number");
                None
            }
        }
    };

    let explorer = payload
        .block_explore_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(url) = explorer {
        if !is_valid_url(url, Schemes::Any) {
            errors.insert("blockExploreUrl", "Please enter a valid block explorer URL.");
        }
    }

    match (parsed_chain_id, parsed_decimals) {
        (Some(chain_id), Some(decimals)) if errors.is_empty() => Ok(ChainDescriptor {
            chain_id,
            chain_name: name.to_string(),
            native_currency: NativeCurrency {
                name: None,
                symbol: symbol.to_string(),
                decimals,
            },
            rpc_urls: vec![rpc_url.to_string()],
            block_explorer_urls: explorer.map(|u| vec![u.to_string()]).unwrap_or_default(),
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn network_payload() -> NewNetworkPayload {
        NewNetworkPayload {
            name: "Local devnet".into(),
            rpc_url: "http://127.0.0.1:8545".into(),
            chain_id: "31337".into(),
            currency_symbol: "ETH".into(),
            currency_decimals: "18".into(),
            block_explore_url: None,
        }
    }

    #[test]
    fn address_checksum_rules() {
        assert!(is_valid_address("0x77D89FF4b6bc52057d6116F4928072018Ee6f36E"));
        assert!(is_valid_address("0x77d89ff4b6bc52057d6116f4928072018ee6f36e"));
        assert!(is_valid_address("0x77D89FF4B6BC52057D6116F4928072018EE6F36E"));
        // one flipped letter breaks the checksum
        assert!(!is_valid_address("0x77D89FF4b6bc52057d6116F4928072018Ee6f36e"));
        assert!(!is_valid_address("77d89ff4b6bc52057d6116f4928072018ee6f36e"));
        assert!(!is_valid_address("0x77d89ff4b6bc"));
        assert!(!is_valid_address("0xzzd89ff4b6bc52057d6116f4928072018ee6f36e"));
    }

    #[test]
    fn transfer_payload_is_parsed() {
        let transfer = validate_transfer(&TransferPayload {
            network: "5".into(),
            to: "0x77D89FF4b6bc52057d6116F4928072018Ee6f36E".into(),
            amount: "0.12".into(),
            nonce: "3".into(),
        })
        .unwrap();
        assert_eq!(transfer.chain_id, Some(5));
        assert_eq!(transfer.value, U256::from(120_000_000_000_000_000u64));
        assert_eq!(transfer.nonce, 3);
    }

    #[test]
    fn transfer_payload_reports_each_field() {
        let errs = validate_transfer(&TransferPayload {
            network: "abc".into(),
            to: "0x1234".into(),
            amount: "".into(),
            nonce: "-1".into(),
        })
        .unwrap_err();
        assert_eq!(errs.len(), 4);
        assert_eq!(errs.get("to"), Some(messages::ADDRESS_FORMAT));
        assert_eq!(errs.get("amount"), Some("Amount is required"));
        assert!(errs.get("nonce").is_some());
        assert!(errs.get("network").is_some());
    }

    #[test]
    fn transfer_amount_must_be_numeric() {
        let errs = validate_transfer(&TransferPayload {
            network: String::new(),
            to: "0x77d89ff4b6bc52057d6116f4928072018ee6f36e".into(),
            amount: "one".into(),
            nonce: "0".into(),
        })
        .unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs.get("amount").is_some());
    }

    #[test]
    fn new_network_builds_descriptor() {
        let mut payload = network_payload();
        payload.block_explore_url = Some("https://explorer.local".into());
        let desc = validate_new_network(&payload).unwrap();
        assert_eq!(desc.chain_id, 31337);
        assert_eq!(desc.native_currency.decimals, 18);
        assert_eq!(desc.rpc_urls, vec!["http://127.0.0.1:8545".to_string()]);
        assert_eq!(desc.block_explorer_urls, vec!["https://explorer.local".to_string()]);
    }

    #[test]
    fn new_network_explorer_is_optional() {
        let mut payload = network_payload();
        payload.block_explore_url = Some("   ".into());
        let desc = validate_new_network(&payload).unwrap();
        assert!(desc.block_explorer_urls.is_empty());

        payload.block_explore_url = Some("explorer".into());
        let errs = validate_new_network(&payload).unwrap_err();
        assert!(errs.get("blockExploreUrl").is_some());
    }

    #[test]
    fn new_network_limits() {
        let mut payload = network_payload();
        payload.name = "x".repeat(31);
        payload.rpc_url = "ws://127.0.0.1:8546".into();
        payload.chain_id = "18446744073709551616".into();
        payload.currency_symbol = "E".into();
        payload.currency_decimals = "0".into();
        let errs = validate_new_network(&payload).unwrap_err();
        assert_eq!(errs.get("name"), Some("Should be less than 30 characters."));
        assert_eq!(errs.get("rpcUrl"), Some("Please enter a valid RPC URL."));
        assert_eq!(errs.get("chainId"), Some("Chain ID is too large."));
        assert_eq!(errs.get("currencySymbol"), Some(messages::CURRENCY_SYMBOL));
        assert_eq!(errs.get("currencyDecimals"), Some("Should be at least 1"));

        payload = network_payload();
        payload.chain_id = "-5".into();
        payload.currency_decimals = "101".into();
        let errs = validate_new_network(&payload).unwrap_err();
        assert_eq!(errs.get("chainId"), Some("Chain ID should be greater than zero."));
        assert_eq!(errs.get("currencyDecimals"), Some("Should be at most 100"));
    }
}
