//! sendx - wallet session and transfer manager for EVM dApp front ends
//!
//! Connects to an injected wallet, tracks native-currency transfers sent with an
//! explicit nonce until they are mined, and manages the wallet's networks
//! (switching, adding, a persisted registry of known chains).
//!
//! ## Targets
//!
//! - **Web** (wasm32): `webshim::InjectedProvider` over `window.ethereum`,
//!   `BrowserStore` for persistence, `wasm_api` helpers for a JS shell
//! - **Native** (`native` feature): `rpc_utils::HttpProvider` against a JSON-RPC
//!   node, `FileStore`, and the `sendx` CLI
//!
//! ```bash
//! cargo build --features native
//! ```

// Core modules (available on all platforms)
pub mod constants;
pub mod error;
pub mod types;
pub mod util_text;
pub mod validate;

// Persistence and the network registry
pub mod registry;
pub mod storage;

// Wallet provider surface and per-capability senders
pub mod provider;
pub mod sender;

// State, session and the flows driving it
pub mod app;
pub mod network;
pub mod session;
pub mod transfer;

pub mod config;

// Platform abstraction layer
#[cfg(any(feature = "native", target_arch = "wasm32"))]
pub mod platform;

// JSON-RPC over HTTP (native only)
#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod rpc_utils;

// Injected wallet bridge (wasm32 only)
#[cfg(target_arch = "wasm32")]
pub mod webshim;

// WASM-facing exports (JS -> Rust) are only built on wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

// Re-export commonly used types
pub use app::{Action, App, Notice, NoticeAction, NoticeLevel};
pub use error::{ErrorKind, NetworkError, ProviderError, SessionError, TransferError};
pub use provider::{SendCapability, WalletProvider};
pub use registry::NetworkRegistry;
pub use session::Session;
pub use storage::{KeyValueStore, MemoryStore};
pub use types::{AppEvent, ChainDescriptor, NewNetworkPayload, PendingTransaction, TransferPayload};
