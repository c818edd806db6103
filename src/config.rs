use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::provider::SendCapability;
use crate::types::{ChainDescriptor, NewNetworkPayload};
use crate::validate::{is_valid_rpc_url, validate_new_network};

const DEFAULT_CONFIG_FILE: &str = "sendx.toml";
const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
const DEFAULT_STORE_PATH: &str = ".sendx/store.json";

/// sendx - native-currency transfers with explicit nonces
///
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug)]
#[command(name = "sendx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Send transfers and manage networks through a JSON-RPC wallet", long_about = None)]
pub struct CliArgs {
    /// TOML config file (defaults to ./sendx.toml when present)
    #[arg(short, long, env = "SENDX_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint of the node holding the account
    #[arg(long, env = "SENDX_RPC_URL")]
    pub rpc_url: Option<String>,

    /// RPC request timeout in milliseconds (1000-60000)
    #[arg(long, env = "SENDX_RPC_TIMEOUT_MS")]
    pub rpc_timeout_ms: Option<u64>,

    /// Receipt polling interval in milliseconds (100-60000)
    #[arg(long, env = "SENDX_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Key/value store file (network list, connected flag)
    #[arg(long, env = "SENDX_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// Send path: typed or raw (defaults to what the provider reports)
    #[arg(long, env = "SENDX_SEND_MODE", value_parser = clap::value_parser!(SendCapability))]
    pub send_mode: Option<SendCapability>,

    /// Fractional digits shown for balances (0-18)
    #[arg(long, env = "SENDX_BALANCE_DIGITS")]
    pub balance_digits: Option<usize>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, env = "SENDX_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List known networks
    Networks,

    /// Validate a network and add it to the wallet and the local list
    AddNetwork {
        #[arg(long)]
        name: String,
        /// RPC URL of the new network
        #[arg(long = "rpc")]
        rpc: String,
        /// Decimal or 0x-prefixed hex
        #[arg(long)]
        chain_id: String,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "18")]
        decimals: String,
        #[arg(long)]
        explorer: Option<String>,
    },

    /// Ask the wallet to switch chains
    Switch {
        /// Decimal or 0x-prefixed hex
        chain_id: String,
        /// Offer the network to the wallet when it is not recognized
        #[arg(long)]
        add_if_missing: bool,
    },

    /// Show account, chain, balance and nonce
    Balance,

    /// Send a native-currency transfer
    Send {
        #[arg(long)]
        to: String,
        /// Amount in major units, e.g. 0.01
        #[arg(long)]
        amount: String,
        /// Explicit nonce (defaults to the wallet's current count)
        #[arg(long)]
        nonce: Option<String>,
        /// Return after submission instead of waiting to be mined
        #[arg(long)]
        no_wait: bool,
    },
}

/// `[[networks]]` entry in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkEntry {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default)]
    pub explorer_url: Option<String>,
}

fn default_decimals() -> u32 {
    18
}

impl NetworkEntry {
    /// Runs the same checks as the add-network form.
    pub fn to_descriptor(&self) -> Result<ChainDescriptor> {
        let payload = NewNetworkPayload {
            name: self.name.clone(),
            rpc_url: self.rpc_url.clone(),
            chain_id: self.chain_id.to_string(),
            currency_symbol: self.symbol.clone(),
            currency_decimals: self.decimals.to_string(),
            block_explore_url: self.explorer_url.clone(),
        };
        validate_new_network(&payload)
            .map_err(|errs| anyhow!("network '{}' in config: {errs}", self.name))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub rpc_url: Option<String>,
    pub rpc_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub store_path: Option<PathBuf>,
    pub send_mode: Option<String>,
    pub balance_digits: Option<usize>,
    pub log_level: Option<String>,
    pub networks: Vec<NetworkEntry>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub rpc_url: String,
    pub rpc_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub store_path: PathBuf,
    pub send_mode: Option<SendCapability>,
    pub balance_digits: usize,
    pub log_level: log::Level,
    pub networks: Vec<ChainDescriptor>,
    pub config_file: Option<PathBuf>,
    pub command: Command,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Load configuration from CLI args, environment variables and the config file
/// Priority: CLI args > Environment variables > Config file > Defaults
pub fn load() -> Result<Config> {
    resolve(CliArgs::parse())
}

pub fn resolve(args: CliArgs) -> Result<Config> {
    let config_file = match args.config {
        Some(path) => Some(path),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };
    let file = match &config_file {
        Some(path) => FileConfig::read(path)?,
        None => FileConfig::default(),
    };

    let rpc_url = args
        .rpc_url
        .or(file.rpc_url)
        .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
    if !is_valid_rpc_url(&rpc_url) {
        return Err(anyhow!("SENDX_RPC_URL must be an http:// or https:// URL, got '{rpc_url}'"));
    }

    let rpc_timeout_ms = args.rpc_timeout_ms.or(file.rpc_timeout_ms).unwrap_or(10_000);
    let rpc_timeout_ms = validate_in_range(rpc_timeout_ms, 1000, 60_000, "SENDX_RPC_TIMEOUT_MS")?;

    let poll_interval_ms = args
        .poll_interval_ms
        .or(file.poll_interval_ms)
        .unwrap_or(2000);
    let poll_interval_ms =
        validate_in_range(poll_interval_ms, 100, 60_000, "SENDX_POLL_INTERVAL_MS")?;

    let balance_digits = args.balance_digits.or(file.balance_digits).unwrap_or(4);
    let balance_digits = validate_in_range(balance_digits, 0, 18, "SENDX_BALANCE_DIGITS")?;

    let send_mode = match args.send_mode {
        Some(mode) => Some(mode),
        None => file
            .send_mode
            .as_deref()
            .map(str::parse::<SendCapability>)
            .transpose()?,
    };

    let log_level = args
        .log_level
        .or(file.log_level)
        .map(|s| {
            s.parse::<log::Level>()
                .map_err(|_| anyhow!("SENDX_LOG_LEVEL '{s}' is not a log level"))
        })
        .transpose()?
        .unwrap_or(log::Level::Info);

    let networks = file
        .networks
        .iter()
        .map(NetworkEntry::to_descriptor)
        .collect::<Result<Vec<_>>>()?;

    Ok(Config {
        rpc_url,
        rpc_timeout_ms,
        poll_interval_ms,
        store_path: args
            .store_path
            .or(file.store_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
        send_mode,
        balance_digits,
        log_level,
        networks,
        config_file,
        command: args.command,
    })
}

impl Config {
    pub fn print_summary(&self) {
        eprintln!("sendx configuration:");
        if let Some(path) = &self.config_file {
            eprintln!("  Config file: {}", path.display());
        }
        eprintln!("  RPC URL: {}", self.rpc_url);
        eprintln!("  RPC Timeout: {}ms", self.rpc_timeout_ms);
        eprintln!("  Receipt Poll: {}ms", self.poll_interval_ms);
        eprintln!("  Store: {}", self.store_path.display());
        match self.send_mode {
            Some(mode) => eprintln!("  Send Mode: {mode}"),
            None => eprintln!("  Send Mode: provider default"),
        }
        eprintln!("  Balance Digits: {}", self.balance_digits);
        if !self.networks.is_empty() {
            eprintln!("  Extra Networks: {}", self.networks.len());
        }
    }
}
