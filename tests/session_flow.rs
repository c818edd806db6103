mod common;

use alloy_primitives::{Address, U256};
use serde_json::json;

use common::{rejected, session, MockProvider, ACCOUNT};
use sendx::app::{NoticeLevel, SessionState};
use sendx::constants::{messages, storage::CONNECTED_KEY};
use sendx::error::{ProviderError, SessionError};
use sendx::provider::SendCapability;
use sendx::storage::{KeyValueStore, MemoryStore};
use sendx::Session;

fn account() -> Address {
    ACCOUNT.parse().unwrap()
}

#[tokio::test]
async fn connect_captures_account_chain_and_balances() {
    let mut s = session(MockProvider::wallet());
    s.connect().await.unwrap();

    let app = s.app();
    let state = app.session();
    assert!(state.connected);
    assert_eq!(state.account, Some(account()));
    assert_eq!(state.chain_id, Some(5));
    assert_eq!(state.balance, U256::from(1_000_000_000_000_000_000u64));
    assert_eq!(state.nonce, 3);
    assert_eq!(app.form().nonce, "3");
    drop(app);
    assert_eq!(s.capability(), Some(SendCapability::TypedSend));
    assert_eq!(s.store().get(CONNECTED_KEY).as_deref(), Some("true"));

    let notices = s.app_mut().take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, messages::CONNECTED);
}

#[tokio::test]
async fn connecting_twice_only_notifies() {
    let mut s = session(MockProvider::wallet());
    s.connect().await.unwrap();
    s.app_mut().take_notices();

    s.connect().await.unwrap();
    assert_eq!(s.provider().calls_to("eth_requestAccounts").len(), 1);
    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].message, messages::ALREADY_CONNECTED);
}

#[tokio::test]
async fn canceled_authorization_stays_disconnected() {
    let provider = MockProvider::wallet();
    provider.on(
        "eth_requestAccounts",
        Err(ProviderError::new(None, "user_canceled")),
    );
    let mut s = session(provider);

    let err = s.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::Canceled(_)));
    assert!(!s.is_connected());
    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert_eq!(notices[0].message, messages::CONNECT_CANCELED);
}

#[tokio::test]
async fn rejected_authorization_counts_as_canceled() {
    let provider = MockProvider::wallet();
    provider.on("eth_requestAccounts", Err(rejected()));
    let mut s = session(provider);
    assert!(matches!(
        s.connect().await.unwrap_err(),
        SessionError::Canceled(_)
    ));
}

#[tokio::test]
async fn connect_failure_is_reported() {
    let provider = MockProvider::wallet();
    provider.on(
        "eth_requestAccounts",
        Err(ProviderError::new(Some(-32002), "Request already pending")),
    );
    let mut s = session(provider);

    let err = s.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::Connect(_)));
    assert_eq!(s.app().session(), &SessionState::default());
    assert!(s.store().get(CONNECTED_KEY).is_none());
    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, messages::CONNECT_FAILED);
}

#[tokio::test]
async fn empty_account_list_is_an_error() {
    let provider = MockProvider::wallet();
    provider.on("eth_requestAccounts", Ok(json!([])));
    let mut s = session(provider);
    assert!(matches!(
        s.connect().await.unwrap_err(),
        SessionError::NoAccounts
    ));
    assert!(!s.is_connected());
}

#[tokio::test]
async fn disconnect_clears_session_and_flag() {
    let mut s = common::connected(MockProvider::wallet()).await;
    s.disconnect();

    assert_eq!(s.app().session(), &SessionState::default());
    assert_eq!(s.capability(), None);
    assert!(s.store().get(CONNECTED_KEY).is_none());
    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].message, messages::DISCONNECTED);
}

#[tokio::test]
async fn restore_reconnects_without_prompting() {
    let store = MemoryStore::new();
    store.set(CONNECTED_KEY, "true").unwrap();
    let mut s = Session::new(MockProvider::wallet(), store);

    assert!(s.restore().await.unwrap());
    assert!(s.is_connected());
    assert_eq!(s.app().session().nonce, 3);
    assert!(s.provider().calls_to("eth_requestAccounts").is_empty());
    assert_eq!(s.provider().calls_to("eth_accounts").len(), 1);
    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].message, messages::CONNECTED);
}

#[tokio::test]
async fn restore_needs_flag_and_exposed_account() {
    let mut s = session(MockProvider::wallet());
    assert!(!s.restore().await.unwrap());
    assert!(s.provider().calls().is_empty());

    let store = MemoryStore::new();
    store.set(CONNECTED_KEY, "true").unwrap();
    let provider = MockProvider::wallet();
    provider.on("eth_accounts", Ok(json!([])));
    let mut s = Session::new(provider, store);
    assert!(!s.restore().await.unwrap());
    assert!(!s.is_connected());
}

#[tokio::test]
async fn capability_override_wins_over_provider() {
    let mut s = session(MockProvider::wallet()).with_capability(SendCapability::RawRequest);
    s.connect().await.unwrap();
    assert_eq!(s.capability(), Some(SendCapability::RawRequest));
}

#[tokio::test]
async fn failed_refresh_keeps_the_connection() {
    let provider = MockProvider::wallet();
    provider.on(
        "eth_getBalance",
        Err(ProviderError::transport("http 503 Service Unavailable")),
    );
    let mut s = session(provider);
    s.connect().await.unwrap();

    assert!(s.is_connected());
    assert_eq!(s.app().session().balance, U256::ZERO);
    assert!(s.refresh_account().await.is_err());
}

#[tokio::test]
async fn failed_balance_query_keeps_the_fetched_nonce() {
    let mut s = common::connected(MockProvider::wallet()).await;
    s.provider().once(
        "eth_getBalance",
        Err(ProviderError::new(Some(-32603), "header not found")),
    );
    s.provider().on("eth_getTransactionCount", Ok(json!("0x9")));

    assert!(s.refresh_account().await.is_err());
    assert_eq!(s.app().session().nonce, 9);
    assert_eq!(s.app().form().nonce, "9");
    assert_eq!(
        s.app().session().balance,
        U256::from(1_000_000_000_000_000_000u64)
    );
}
