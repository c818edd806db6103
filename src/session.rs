//! Wallet session: connection lifecycle and account refresh
//!
//! `Session` owns the provider and the injected store and shares the [`App`]
//! state through [`Session::app_handle`], so a front end can read it while a
//! wallet call is pending. The transfer and network flows live in `transfer.rs`
//! and `network.rs` as further `impl Session` blocks.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use alloy_primitives::{Address, B256};
use futures::future::{FutureExt, LocalBoxFuture};

use crate::app::{Action, App, Notice};
use crate::constants::{messages, storage::CONNECTED_KEY};
use crate::error::{ErrorKind, ProviderError, SessionError};
use crate::provider::{SendCapability, WalletProvider};
use crate::registry::NetworkRegistry;
use crate::sender::{sender_for, TransferSender};
use crate::storage::KeyValueStore;
use crate::types::AppEvent;
use crate::util_text::format_address;

pub struct Session<P, S> {
    pub(crate) provider: Rc<P>,
    pub(crate) store: S,
    pub(crate) app: Rc<RefCell<App>>,
    pub(crate) sender: Option<Box<dyn TransferSender>>,
    capability_override: Option<SendCapability>,
}

impl<P, S> Session<P, S>
where
    P: WalletProvider + 'static,
    S: KeyValueStore,
{
    /// New session with the registry restored from `store`.
    pub fn new(provider: P, store: S) -> Self {
        let networks = NetworkRegistry::load(&store);
        Self::with_registry(provider, store, networks)
    }

    pub fn with_registry(provider: P, store: S, networks: NetworkRegistry) -> Self {
        Self {
            provider: Rc::new(provider),
            store,
            app: Rc::new(RefCell::new(App::new(networks))),
            sender: None,
            capability_override: None,
        }
    }

    /// Force a send path instead of the one the provider reports.
    pub fn with_capability(mut self, capability: SendCapability) -> Self {
        self.capability_override = Some(capability);
        self
    }

    /// Borrows the state; the borrow must end before the next session call.
    pub fn app(&self) -> Ref<'_, App> {
        self.app.borrow()
    }

    pub fn app_mut(&mut self) -> RefMut<'_, App> {
        self.app.borrow_mut()
    }

    /// Shared state handle. Session calls only borrow it between awaits.
    pub fn app_handle(&self) -> Rc<RefCell<App>> {
        Rc::clone(&self.app)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn account(&self) -> Option<Address> {
        self.app.borrow().session().account
    }

    pub fn is_connected(&self) -> bool {
        self.app.borrow().session().connected
    }

    /// Send path chosen at connect time; `None` while disconnected.
    pub fn capability(&self) -> Option<SendCapability> {
        self.sender.as_ref().map(|s| s.capability())
    }

    /// Whether `hash` is still listed as pending and will be handled when mined.
    pub fn is_watching(&self, hash: &B256) -> bool {
        self.app.borrow().is_pending(hash)
    }

    pub(crate) fn dispatch(&self, action: Action) {
        self.app.borrow_mut().apply(action);
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.dispatch(Action::Notify(notice));
    }

    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.is_connected() {
            self.notify(Notice::info(messages::ALREADY_CONNECTED));
            return Ok(());
        }

        let accounts = match self.provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => return Err(self.connect_failed(e)),
        };
        let Some(account) = accounts.first().copied() else {
            self.notify(Notice::error(messages::CONNECT_FAILED));
            return Err(SessionError::NoAccounts);
        };
        let chain_id = match self.provider.chain_id().await {
            Ok(id) => id,
            Err(e) => return Err(self.connect_failed(e)),
        };

        self.establish(account, chain_id).await;
        self.notify(Notice::success(messages::CONNECTED));
        Ok(())
    }

    fn connect_failed(&mut self, e: ProviderError) -> SessionError {
        match e.kind() {
            ErrorKind::Canceled | ErrorKind::UserRejected => {
                self.notify(Notice::info(messages::CONNECT_CANCELED));
                SessionError::Canceled(e)
            }
            _ => {
                self.notify(Notice::error(messages::CONNECT_FAILED));
                SessionError::Connect(e)
            }
        }
    }

    /// Reconnect without prompting when the previous session was connected and
    /// the wallet still exposes an account. Returns whether it reconnected.
    pub async fn restore(&mut self) -> Result<bool, SessionError> {
        if self.is_connected() || self.store.get(CONNECTED_KEY).as_deref() != Some("true") {
            return Ok(false);
        }

        let accounts = self
            .provider
            .accounts()
            .await
            .map_err(SessionError::Connect)?;
        let Some(account) = accounts.first().copied() else {
            log::info!("wallet no longer exposes an account; staying disconnected");
            return Ok(false);
        };
        let chain_id = self
            .provider
            .chain_id()
            .await
            .map_err(SessionError::Connect)?;

        self.establish(account, chain_id).await;
        self.notify(Notice::success(messages::CONNECTED));
        Ok(true)
    }

    async fn establish(&mut self, account: Address, chain_id: u64) {
        let capability = self
            .capability_override
            .unwrap_or_else(|| self.provider.capability());
        log::info!("connected {account} on chain {chain_id} ({capability} send)");

        self.sender = Some(sender_for(capability));
        self.dispatch(Action::Connected { account, chain_id });
        if let Err(e) = self.store.set(CONNECTED_KEY, "true") {
            log::warn!("failed to persist connected flag: {e:#}");
        }
        if let Err(e) = self.refresh_account().await {
            log::warn!("initial account refresh failed: {e}");
        }
    }

    pub fn disconnect(&mut self) {
        self.sender = None;
        self.dispatch(Action::Disconnected);
        if let Err(e) = self.store.remove(CONNECTED_KEY) {
            log::warn!("failed to clear connected flag: {e:#}");
        }
        self.notify(Notice::info(messages::DISCONNECTED));
    }

    /// Re-fetch balance and nonce for the connected account. The nonce always
    /// comes from the wallet, never from local counting.
    pub async fn refresh_account(&mut self) -> Result<(), ProviderError> {
        refresh_into(&*self.provider, &self.app).await
    }

    /// One-shot watch for `hash`. The future owns its provider and state
    /// handles and folds the mined event into the shared state itself, so it
    /// can be driven by `platform::spawn_local` while the session stays usable.
    /// The returned event only reports the outcome.
    pub fn mined_watch(&self, hash: B256) -> LocalBoxFuture<'static, AppEvent> {
        let provider = Rc::clone(&self.provider);
        let app = Rc::clone(&self.app);
        async move {
            match provider.wait_mined(hash).await {
                Ok(()) => {
                    fold_mined(&*provider, &app, hash).await;
                    AppEvent::TxMined { hash }
                }
                Err(e) => {
                    // the entry stays listed; a later on_mined still removes it
                    log::warn!("mined watch for {hash} failed: {e}");
                    AppEvent::WatchFailed {
                        hash,
                        message: e.to_string(),
                    }
                }
            }
        }
        .boxed_local()
    }
}

/// Balance and nonce are fetched together and applied independently, so one
/// failed query does not discard the other's result.
pub(crate) async fn refresh_into<P>(provider: &P, app: &RefCell<App>) -> Result<(), ProviderError>
where
    P: WalletProvider,
{
    let Some(account) = app.borrow().session().account else {
        return Ok(());
    };
    let (balance, nonce) = futures::join!(
        provider.balance(account),
        provider.transaction_count(account)
    );

    let mut app = app.borrow_mut();
    let balance = balance.map(|b| app.apply(Action::BalanceFetched(b)));
    let nonce = nonce.map(|n| app.apply(Action::NonceFetched(n)));
    balance.and(nonce)
}

/// Mined handling against the pending list: a hash with no pending entry is
/// ignored, so each transaction is handled at most once.
pub(crate) async fn fold_mined<P>(provider: &P, app: &RefCell<App>, hash: B256) -> bool
where
    P: WalletProvider,
{
    if !app.borrow().is_pending(&hash) {
        log::debug!("ignoring mined event for {hash}: not pending");
        return false;
    }

    app.borrow_mut().apply(Action::Notify(Notice::success(format!(
        "Transaction {} has been mined",
        format_address(&hash.to_string())
    ))));
    if let Err(e) = refresh_into(provider, app).await {
        log::warn!("account refresh after mining failed: {e}");
    }
    app.borrow_mut().apply(Action::TxMined(hash));
    true
}
