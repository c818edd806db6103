//! JS -> Rust surface for a browser shell.
//!
//! `WalletSession` drives the injected wallet; the free functions are pure
//! helpers for display formatting and form validation.

#![cfg(target_arch = "wasm32")]

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use alloy_primitives::U256;
use js_sys::Promise;
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app::{Action, App, NoticeAction, NoticeLevel};
use crate::constants::tx::DEFAULT_BALANCE_DIGITS;
use crate::platform;
use crate::session::Session;
use crate::storage::{BrowserStore, StorageScope};
use crate::types::{NewNetworkPayload, TransferPayload};
use crate::util_text;
use crate::validate::{self, Schemes};
use crate::webshim::InjectedProvider;

type BrowserSession = Session<InjectedProvider, BrowserStore>;

/// Session over `window.ethereum`, persisted in `sessionStorage`.
///
/// Async methods return promises; only one wallet request may be in flight at
/// a time. State and notices stay readable while one is pending.
#[wasm_bindgen]
pub struct WalletSession {
    inner: Rc<RefCell<BrowserSession>>,
    app: Rc<RefCell<App>>,
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn busy(inner: &Rc<RefCell<BrowserSession>>) -> Result<RefMut<'_, BrowserSession>, JsValue> {
    inner
        .try_borrow_mut()
        .map_err(|_| JsValue::from_str("another wallet request is in progress"))
}

#[wasm_bindgen]
impl WalletSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WalletSession, JsError> {
        let provider =
            InjectedProvider::detect().ok_or_else(|| JsError::new("No injected wallet found"))?;
        let store = BrowserStore::new(StorageScope::Session);
        let session = Session::new(provider, store);
        Ok(WalletSession {
            app: session.app_handle(),
            inner: Rc::new(RefCell::new(session)),
        })
    }

    pub fn connect(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let mut session = busy(&inner)?;
            session.connect().await.map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to whether a previous connection was restored.
    pub fn restore(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let mut session = busy(&inner)?;
            let restored = session.restore().await.map_err(js_err)?;
            Ok(JsValue::from_bool(restored))
        })
    }

    pub fn disconnect(&self) -> Result<(), JsValue> {
        busy(&self.inner)?.disconnect();
        Ok(())
    }

    /// Resolves to the transaction hash; the pending entry is dropped once mined.
    pub fn send(&self, to: String, amount: String, nonce: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        let network = self
            .app
            .try_borrow()
            .map(|app| app.form().network.clone())
            .unwrap_or_default();
        future_to_promise(async move {
            let payload = TransferPayload {
                network,
                to,
                amount,
                nonce,
            };
            let (hash, watch) = {
                let mut session = busy(&inner)?;
                let hash = session.send_transfer(&payload).await.map_err(js_err)?;
                let watch = session.mined_watch(hash);
                (hash, watch)
            };
            platform::spawn_local(async move {
                watch.await;
            });
            Ok(JsValue::from_str(&hash.to_string()))
        })
    }

    /// Network picked in the form; switches the wallet when it differs.
    pub fn select_network(&self, chain_id: u64) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let mut session = busy(&inner)?;
            session.select_network(chain_id).await.map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn switch_network(&self, chain_id: u64) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let mut session = busy(&inner)?;
            session.switch_network(chain_id).await.map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn request_add_network(&self, chain_id: u64) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let mut session = busy(&inner)?;
            session.request_add_network(chain_id).await.map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn open_network_form(&self) -> Result<(), JsValue> {
        self.apply(Action::OpenNetworkForm)
    }

    pub fn close_network_form(&self) -> Result<(), JsValue> {
        self.apply(Action::CloseNetworkForm)
    }

    /// `payload_json` uses the add-network form field names.
    pub fn add_network(&self, payload_json: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let payload: NewNetworkPayload = serde_json::from_str(&payload_json).map_err(js_err)?;
            let mut session = busy(&inner)?;
            session.add_network_manually(&payload).await.map_err(js_err)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Session, pending rows and known networks as JSON.
    pub fn state_json(&self) -> Result<String, JsValue> {
        let app = self.app.try_borrow().map_err(js_err)?;
        let state = app.session();
        let pending: Vec<_> = app.pending().iter().map(|t| t.summary()).collect();
        let value = json!({
            "connected": state.connected,
            "account": state.account,
            "chainId": state.chain_id,
            "balance": util_text::format_balance(state.balance, DEFAULT_BALANCE_DIGITS),
            "nonce": state.nonce,
            "isSending": app.is_sending(),
            "network": app.form().network,
            "networkFormOpen": app.network_form_open(),
            "pending": pending,
            "networks": app.networks().list(),
        });
        Ok(value.to_string())
    }

    /// Drain notices as JSON and perform a requested reload.
    pub fn take_notices_json(&self) -> Result<String, JsValue> {
        let mut app = self.app.try_borrow_mut().map_err(js_err)?;
        let notices: Vec<_> = app
            .take_notices()
            .into_iter()
            .map(|n| {
                let level = match n.level {
                    NoticeLevel::Info => "info",
                    NoticeLevel::Success => "success",
                    NoticeLevel::Error => "error",
                };
                let add_network = n.action.map(|NoticeAction::AddNetwork { chain_id }| chain_id);
                json!({
                    "level": level,
                    "message": n.message,
                    "addNetwork": add_network,
                    "at": n.at.to_rfc3339(),
                })
            })
            .collect();
        if app.take_reload() {
            platform::reload_page();
        }
        Ok(serde_json::Value::Array(notices).to_string())
    }
}

impl WalletSession {
    fn apply(&self, action: Action) -> Result<(), JsValue> {
        self.app.try_borrow_mut().map_err(js_err)?.apply(action);
        Ok(())
    }
}

#[wasm_bindgen(start)]
pub fn sendx_start() {
    crate::platform::install_panic_hook();
    crate::platform::init_logging(log::Level::Info);
}

#[wasm_bindgen]
pub fn format_address(address: &str) -> String {
    util_text::format_address(address)
}

/// `wei` is a decimal or 0x-hex string; unparseable input formats as "0.0".
#[wasm_bindgen]
pub fn format_balance(wei: &str, digits: usize) -> String {
    let value = wei.parse::<U256>().unwrap_or_default();
    util_text::format_balance(value, digits)
}

/// An empty scheme list accepts any scheme.
#[wasm_bindgen]
pub fn is_valid_url(url: &str, schemes: Vec<String>) -> bool {
    let schemes: Vec<&str> = schemes.iter().map(String::as_str).collect();
    validate::is_valid_url(url, Schemes::OneOf(&schemes))
}

#[wasm_bindgen]
pub fn is_valid_rpc_url(url: &str) -> bool {
    validate::is_valid_rpc_url(url)
}

#[wasm_bindgen]
pub fn is_valid_address(address: &str) -> bool {
    validate::is_valid_address(address)
}

#[wasm_bindgen]
pub fn number_to_chain_id(chain_id: u64) -> String {
    util_text::number_to_chain_id(chain_id)
}

fn errors_json(errors: &crate::error::FieldErrors) -> String {
    let map: serde_json::Map<String, serde_json::Value> = errors
        .iter()
        .map(|(field, msg)| (field.to_string(), json!(msg)))
        .collect();
    serde_json::Value::Object(map).to_string()
}

/// Field errors for a transfer form as a JSON object; `{}` when valid.
#[wasm_bindgen]
pub fn validate_transfer(payload_json: &str) -> Result<String, JsError> {
    let payload: TransferPayload = serde_json::from_str(payload_json)?;
    Ok(match validate::validate_transfer(&payload) {
        Ok(_) => "{}".to_string(),
        Err(errors) => errors_json(&errors),
    })
}

/// Validated add-network request (`wallet_addEthereumChain` shape) or field errors.
#[wasm_bindgen]
pub fn validate_new_network(payload_json: &str) -> Result<String, JsError> {
    let payload: NewNetworkPayload = serde_json::from_str(payload_json)?;
    match validate::validate_new_network(&payload) {
        Ok(network) => Ok(serde_json::to_string(&network.to_chain_info())?),
        Err(errors) => Err(JsError::new(&errors_json(&errors))),
    }
}
