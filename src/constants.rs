//! Application constants
//!
//! Centralized constants for transaction defaults, storage keys, the built-in
//! network list, and user-facing notice strings.

use crate::types::{ChainDescriptor, NativeCurrency};

/// Transaction defaults
pub mod tx {
    /// Gas limit for a plain native-currency transfer
    pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

    /// EIP-1559 transaction type
    pub const EIP1559_TYPE: u8 = 2;

    /// Priority fee suggested when the latest block carries a base fee (1.5 gwei)
    pub const DEFAULT_PRIORITY_FEE_WEI: u64 = 1_500_000_000;

    /// Decimals of the native currency used for amounts and balances
    pub const NATIVE_DECIMALS: u8 = 18;

    /// Fractional digits shown for balances unless configured otherwise
    pub const DEFAULT_BALANCE_DIGITS: usize = 4;
}

/// Form limits for manually added networks
pub mod limits {
    pub const NAME_MIN_CHARS: usize = 1;
    pub const NAME_MAX_CHARS: usize = 30;
    pub const SYMBOL_MIN_CHARS: usize = 2;
    pub const SYMBOL_MAX_CHARS: usize = 6;
    pub const DECIMALS_MIN: u32 = 1;
    pub const DECIMALS_MAX: u32 = 100;
}

/// Persistent storage keys
pub mod storage {
    /// Network registry (JSON array of chain descriptors)
    pub const NETWORKS_KEY: &str = "sendx.networks";

    /// "true" while the user wants the wallet connected across reloads
    pub const CONNECTED_KEY: &str = "sendx.connected";
}

/// User-facing notice strings
pub mod messages {
    pub const CONNECTED: &str = "Connected!";
    pub const ALREADY_CONNECTED: &str = "Already connected";
    pub const CONNECT_CANCELED: &str =
        "Operation canceled, please refresh and try to reauthorize.";
    pub const CONNECT_FAILED: &str = "Failed to connect wallet.";
    pub const DISCONNECTED: &str = "Disconnected";

    pub const FEE_FAILED: &str = "Failed to fetch fee data, please retry!";
    pub const TX_REJECTED: &str = "User rejected transaction!";
    pub const TX_FAILED: &str = "Send failed!";
    pub const WRONG_NETWORK: &str = "Switch the wallet to this network before sending";

    pub const SWITCH_OK: &str = "Switch network successfully";
    pub const SWITCH_UNRECOGNIZED: &str = "Unrecognized network. Try adding the network first.";
    pub const SWITCH_REJECTED: &str = "User rejected switching network";
    pub const SWITCH_FAILED: &str = "Failed to switch network";

    pub const ADD_REJECTED: &str = "User rejected adding network";
    pub const ADD_FAILED: &str = "Failed to add network";

    pub const ADDRESS_FORMAT: &str = "The recipient's address format is wrong. Please check the address length and character content and try again";
    pub const CURRENCY_SYMBOL: &str = "Currency symbol should be a string of 2 to 6 chars";
}

/// Networks every session starts with, in display order.
pub fn builtin_networks() -> Vec<ChainDescriptor> {
    vec![
        builtin(
            1,
            "Ethereum main network",
            "ETH",
            18,
            "https://mainnet.infura.io/v3/c4075c0c4d044d7ab858b17f97c6b209",
            "https://etherscan.io",
        ),
        builtin(
            5,
            "Goerli test network",
            "GoerliETH",
            18,
            "https://goerli.infura.io/v3/c4075c0c4d044d7ab858b17f97c6b209",
            "https://goerli.etherscan.io",
        ),
        builtin(
            10,
            "Optimism",
            "ETH",
            18,
            "https://mainnet.optimism.io/",
            "https://optimistic.etherscan.io",
        ),
        builtin(
            56,
            "Binance Smart Chain",
            "BNB",
            18,
            "https://bsc-dataseed.binance.org/",
            "https://bscscan.com",
        ),
        // Deliberately unknown to wallets; exercises the add-network fallback.
        builtin(
            10_899_999,
            "NonExist Network",
            "NEN",
            18,
            "https://mainnet.infura.io/v3/c4075c0c4d044d7ab858b17f97c6b209",
            "https://etherscan.io/",
        ),
    ]
}

fn builtin(
    chain_id: u64,
    name: &str,
    symbol: &str,
    decimals: u8,
    rpc_url: &str,
    explorer_url: &str,
) -> ChainDescriptor {
    ChainDescriptor {
        chain_id,
        chain_name: name.to_string(),
        native_currency: NativeCurrency {
            name: None,
            symbol: symbol.to_string(),
            decimals,
        },
        rpc_urls: vec![rpc_url.to_string()],
        block_explorer_urls: vec![explorer_url.to_string()],
    }
}
