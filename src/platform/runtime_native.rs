use std::future::Future;
use std::sync::Once;
use std::time::Duration as StdDuration;

pub type Duration = StdDuration;

static LOGGER_INIT: Once = Once::new();

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: log::Level) {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .parse_default_env()
            .format_timestamp_millis()
            .try_init();
    });
}

pub fn install_panic_hook() {}

/// Nothing to reload natively; the next command starts from fresh chain state.
pub fn reload_page() {
    log::debug!("reload requested");
}

/// Must be called from within a `tokio::task::LocalSet`.
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    tokio::task::spawn_local(future);
}
