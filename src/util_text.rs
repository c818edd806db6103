use alloy_primitives::U256;

use crate::constants::tx::NATIVE_DECIMALS;

/// Shorten an address or hash for display: `0x77...f36E`
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

/// Render a base-unit amount in major units, trimming trailing zeros but
/// keeping at least one fractional digit ("1.0", "0.12456").
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let frac = frac_part.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };
    format!("{int_part}.{frac}")
}

/// Native-currency balance truncated (never rounded) to `digits` fractional digits.
///
/// `format_balance(124560000000000000, 4) == "0.1245"`
pub fn format_balance(value: U256, digits: usize) -> String {
    format_balance_units(value, NATIVE_DECIMALS, digits)
}

/// Same as [`format_balance`] for a currency with `decimals` decimals.
pub fn format_balance_units(value: U256, decimals: u8, digits: usize) -> String {
    let full = format_units(value, decimals);
    match full.split_once('.') {
        Some((int_part, _)) if digits == 0 => int_part.to_string(),
        Some((int_part, frac)) => {
            let frac: String = frac.chars().take(digits).collect();
            format!("{int_part}.{frac}")
        }
        None => full,
    }
}

/// Chain id in the form `wallet_*` RPC methods expect: `0x` + lowercase hex.
pub fn number_to_chain_id(n: u64) -> String {
    format!("{n:#x}")
}

/// Parse a chain id given either as `0x` hex or as a decimal string.
pub fn parse_chain_id(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None => s.parse().ok(),
    }
}
