//! Injected wallet bridge (`window.ethereum`)
//!
//! Requests cross the JS boundary as JSON text so the typed helpers on
//! [`WalletProvider`] work unchanged in the browser.

use alloy_primitives::B256;
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect, JSON};
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::ProviderError;
use crate::platform::{sleep, Duration};
use crate::provider::{SendCapability, WalletProvider};

pub struct InjectedProvider {
    ethereum: JsValue,
    capability: SendCapability,
    poll_interval: Duration,
}

impl InjectedProvider {
    /// `None` when no wallet injected `window.ethereum`.
    pub fn detect() -> Option<Self> {
        let win = web_sys::window()?;
        let ethereum = Reflect::get(&JsValue::from(win), &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        let capability = if flag(&ethereum, "isImToken") {
            SendCapability::RawRequest
        } else {
            SendCapability::TypedSend
        };
        log::info!("injected wallet detected ({capability} send)");
        Some(Self {
            ethereum,
            capability,
            poll_interval: Duration::from_secs(3),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

fn flag(obj: &JsValue, name: &str) -> bool {
    Reflect::get(obj, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn to_js(value: &Value) -> Result<JsValue, ProviderError> {
    JSON::parse(&value.to_string())
        .map_err(|e| ProviderError::transport(format!("failed to encode params: {e:?}")))
}

fn from_js(value: JsValue) -> Result<Value, ProviderError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Value::Null);
    }
    let text: String = JSON::stringify(&value)
        .map_err(|e| ProviderError::transport(format!("failed to read wallet response: {e:?}")))?
        .into();
    serde_json::from_str(&text).map_err(|e| ProviderError::transport(e.to_string()))
}

/// EIP-1193 errors carry `code` and `message`; some wallets reject with a bare string.
fn js_error(err: JsValue) -> ProviderError {
    if let Some(s) = err.as_string() {
        return ProviderError::new(None, s);
    }
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_default();
    ProviderError::new(code, message)
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let request_fn: Function = Reflect::get(&self.ethereum, &JsValue::from_str("request"))
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| ProviderError::transport("window.ethereum.request is not a function"))?;

        let args = to_js(&json!({ "method": method, "params": params }))?;
        let promise: Promise = request_fn
            .call1(&self.ethereum, &args)
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| ProviderError::transport("wallet request did not return a promise"))?;

        let result = JsFuture::from(promise).await.map_err(js_error)?;
        from_js(result)
    }

    async fn wait_mined(&self, hash: B256) -> Result<(), ProviderError> {
        loop {
            let receipt = self
                .request("eth_getTransactionReceipt", json!([hash]))
                .await?;
            if !receipt.is_null() {
                return Ok(());
            }
            sleep(self.poll_interval).await;
        }
    }

    fn capability(&self) -> SendCapability {
        self.capability
    }
}
