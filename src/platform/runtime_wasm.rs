use std::future::Future;
use std::sync::Once;
use std::time::Duration as StdDuration;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub type Duration = StdDuration;

pub async fn sleep(duration: Duration) {
    let millis = duration.as_millis().min(i32::MAX as u128) as i32;
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        let closure = Closure::once(move || {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        });

        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis,
            );
        }

        closure.forget();
    });

    let _ = JsFuture::from(promise).await;
}

static LOGGER_INIT: Once = Once::new();

/// Console logging via `wasm_logger`; only the first call installs it.
pub fn init_logging(level: log::Level) {
    LOGGER_INIT.call_once(|| {
        wasm_logger::init(wasm_logger::Config::new(level));
    });
}

pub fn install_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Full page reload so every chain-dependent view resyncs.
pub fn reload_page() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().reload() {
        log::warn!("page reload failed: {e:?}");
    }
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}
