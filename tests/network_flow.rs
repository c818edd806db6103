mod common;

use serde_json::{json, Value};

use common::{connected, rejected, MockProvider};
use sendx::app::{NoticeAction, NoticeLevel};
use sendx::constants::{messages, storage::NETWORKS_KEY};
use sendx::error::{NetworkError, ProviderError};
use sendx::storage::KeyValueStore;
use sendx::types::NewNetworkPayload;
use sendx::NetworkRegistry;

fn unrecognized(chain_hex: &str) -> ProviderError {
    ProviderError::new(
        Some(4902),
        format!(
            "Unrecognized chain ID \"{chain_hex}\". Try adding the chain using wallet_addEthereumChain first."
        ),
    )
}

fn anvil() -> NewNetworkPayload {
    NewNetworkPayload {
        name: "Anvil".into(),
        rpc_url: "http://127.0.0.1:8545".into(),
        chain_id: "31337".into(),
        currency_symbol: "ETH".into(),
        currency_decimals: "18".into(),
        block_explore_url: None,
    }
}

#[tokio::test]
async fn unrecognized_switch_offers_add_network_for_same_chain() {
    let mut s = connected(MockProvider::wallet()).await;
    s.provider()
        .once("wallet_switchEthereumChain", Err(unrecognized("0x38")));

    let err = s.switch_network(56).await.unwrap_err();
    assert!(matches!(err, NetworkError::Unrecognized { chain_id: 56, .. }));
    assert!(!s.app_mut().take_reload());

    let notices = s.app_mut().take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, messages::SWITCH_UNRECOGNIZED);
    assert_eq!(
        notices[0].action,
        Some(NoticeAction::AddNetwork { chain_id: 56 })
    );

    // following the offered action adds that same chain
    s.provider().on("wallet_addEthereumChain", Ok(Value::Null));
    let Some(NoticeAction::AddNetwork { chain_id }) = notices[0].action.clone() else {
        unreachable!()
    };
    s.request_add_network(chain_id).await.unwrap();

    let added = s.provider().calls_to("wallet_addEthereumChain");
    assert_eq!(added[0][0]["chainId"], "0x38");
    assert_eq!(added[0][0]["chainName"], "Binance Smart Chain");
    assert!(s.app_mut().take_reload());
}

#[tokio::test]
async fn text_only_unrecognized_error_is_classified() {
    let mut s = connected(MockProvider::wallet()).await;
    s.provider().once(
        "wallet_switchEthereumChain",
        Err(ProviderError::new(None, "Unrecognized chain ID \"0xa\"")),
    );
    let err = s.switch_network(10).await.unwrap_err();
    assert!(matches!(err, NetworkError::Unrecognized { chain_id: 10, .. }));
}

#[tokio::test]
async fn successful_switch_notifies_and_requests_reload() {
    let mut s = connected(MockProvider::wallet()).await;
    s.provider().on("wallet_switchEthereumChain", Ok(Value::Null));

    s.switch_network(20).await.unwrap();

    let calls = s.provider().calls_to("wallet_switchEthereumChain");
    assert_eq!(calls[0], json!([{ "chainId": "0x14" }]));
    assert_eq!(s.app().session().chain_id, Some(20));
    assert!(s.app_mut().take_reload());
    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, messages::SWITCH_OK);
}

#[tokio::test]
async fn rejected_and_failed_switches_are_distinct() {
    let mut s = connected(MockProvider::wallet()).await;
    s.provider().once("wallet_switchEthereumChain", Err(rejected()));
    assert!(matches!(
        s.switch_network(1).await.unwrap_err(),
        NetworkError::Rejected(_)
    ));

    s.provider().once(
        "wallet_switchEthereumChain",
        Err(ProviderError::new(Some(-32603), "Internal error")),
    );
    assert!(matches!(
        s.switch_network(1).await.unwrap_err(),
        NetworkError::Provider(_)
    ));

    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert_eq!(notices[0].message, messages::SWITCH_REJECTED);
    assert_eq!(notices[1].level, NoticeLevel::Error);
    assert_eq!(notices[1].message, messages::SWITCH_FAILED);
    assert!(!s.app_mut().take_reload());
}

#[tokio::test]
async fn adding_an_unknown_registry_entry_fails_locally() {
    let mut s = connected(MockProvider::wallet()).await;
    let err = s.request_add_network(424242).await.unwrap_err();
    assert!(matches!(err, NetworkError::UnknownNetwork(424242)));
    assert!(s.provider().calls_to("wallet_addEthereumChain").is_empty());
}

#[tokio::test]
async fn manual_add_persists_and_closes_the_form() {
    let mut s = connected(MockProvider::wallet()).await;
    s.provider().on("wallet_addEthereumChain", Ok(Value::Null));
    s.app_mut().apply(sendx::Action::OpenNetworkForm);

    s.add_network_manually(&anvil()).await.unwrap();

    let sent = s.provider().calls_to("wallet_addEthereumChain");
    assert_eq!(
        sent[0],
        json!([{
            "chainId": "0x7a69",
            "chainName": "Anvil",
            "nativeCurrency": { "symbol": "ETH", "decimals": 18 },
            "rpcUrls": ["http://127.0.0.1:8545"],
            "blockExplorerUrls": []
        }])
    );

    assert!(!s.app().network_form_open());
    assert_eq!(s.app().networks().list().last().unwrap().chain_id, 31337);
    assert!(s.store().get(NETWORKS_KEY).is_some());
    assert!(NetworkRegistry::load(s.store()).contains(31337));

    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert!(notices[0].message.contains("Anvil"));
}

#[tokio::test]
async fn manual_add_validates_before_calling_the_wallet() {
    let mut s = connected(MockProvider::wallet()).await;
    let payload = NewNetworkPayload {
        rpc_url: "tcp://abc.com/rpc".into(),
        currency_symbol: "X".into(),
        ..anvil()
    };

    let err = s.add_network_manually(&payload).await.unwrap_err();
    let NetworkError::Invalid(errors) = &err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.get("rpcUrl").is_some());
    assert!(errors.get("currencySymbol").is_some());
    assert!(s.provider().calls_to("wallet_addEthereumChain").is_empty());
}

#[tokio::test]
async fn manual_add_failure_surfaces_wallet_message() {
    let mut s = connected(MockProvider::wallet()).await;
    s.app_mut().apply(sendx::Action::OpenNetworkForm);
    s.provider().once(
        "wallet_addEthereumChain",
        Err(ProviderError::new(Some(-32602), "rpcUrls must be an array")),
    );
    s.provider().once(
        "wallet_addEthereumChain",
        Err(ProviderError::new(Some(-32603), "")),
    );

    assert!(s.add_network_manually(&anvil()).await.is_err());
    assert!(s.add_network_manually(&anvil()).await.is_err());

    let notices = s.app_mut().take_notices();
    assert_eq!(notices[0].message, "rpcUrls must be an array");
    assert_eq!(notices[1].message, messages::ADD_FAILED);
    assert!(s.app().network_form_open());
    assert!(!s.app().networks().contains(31337));
}

#[tokio::test]
async fn selecting_another_network_switches_the_wallet() {
    let mut s = connected(MockProvider::wallet()).await;
    s.provider().on("wallet_switchEthereumChain", Ok(Value::Null));

    s.select_network(56).await.unwrap();

    let sent = s.provider().calls_to("wallet_switchEthereumChain");
    assert_eq!(sent, vec![json!([{ "chainId": "0x38" }])]);
    assert_eq!(s.app().session().chain_id, Some(56));
    assert_eq!(s.app().form().network, "56");
    assert!(s.app_mut().take_reload());
}

#[tokio::test]
async fn selecting_the_current_network_skips_the_wallet() {
    let mut s = connected(MockProvider::wallet()).await;

    s.select_network(5).await.unwrap();

    assert!(s.provider().calls_to("wallet_switchEthereumChain").is_empty());
    assert_eq!(s.app().form().network, "5");
    assert!(s.app_mut().take_notices().is_empty());
}
