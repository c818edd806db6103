// Native binary for sendx - one wallet operation per invocation

use anyhow::{anyhow, Context, Result};
use tokio::sync::oneshot;

use sendx::{
    app::{NoticeAction, NoticeLevel},
    config::{load, Command, Config},
    error::NetworkError,
    platform::{self, Duration},
    rpc_utils::HttpProvider,
    storage::FileStore,
    types::{AppEvent, NewNetworkPayload, TransferPayload},
    util_text::{format_balance, number_to_chain_id, parse_chain_id},
    NetworkRegistry, Session,
};

type CliSession = Session<HttpProvider, FileStore>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    platform::init_logging(cfg.log_level);
    platform::install_panic_hook();
    if log::log_enabled!(log::Level::Debug) {
        cfg.print_summary();
    }

    let store = FileStore::open(&cfg.store_path)?;
    let mut registry = NetworkRegistry::load(&store);
    for network in cfg.networks.iter().cloned() {
        registry.upsert(network);
    }

    let provider = HttpProvider::new(cfg.rpc_url.clone())
        .with_timeout(Duration::from_millis(cfg.rpc_timeout_ms))
        .with_poll_interval(Duration::from_millis(cfg.poll_interval_ms));
    let mut session = Session::with_registry(provider, store, registry);
    if let Some(mode) = cfg.send_mode {
        session = session.with_capability(mode);
    }

    // mined watches are spawned onto the local set
    let local = tokio::task::LocalSet::new();
    let result = local.run_until(run(&mut session, &cfg)).await;
    flush(&mut session);
    result
}

async fn run(session: &mut CliSession, cfg: &Config) -> Result<()> {
    match &cfg.command {
        Command::Networks => {
            for n in session.app().networks().list() {
                println!(
                    "{:>10}  {:<10}  {:<20}  {:<6}  {}",
                    n.chain_id,
                    number_to_chain_id(n.chain_id),
                    n.chain_name,
                    n.native_currency.symbol,
                    n.rpc_urls.first().map(String::as_str).unwrap_or("-"),
                );
            }
        }
        Command::AddNetwork {
            name,
            rpc,
            chain_id,
            symbol,
            decimals,
            explorer,
        } => {
            let payload = NewNetworkPayload {
                name: name.clone(),
                rpc_url: rpc.clone(),
                chain_id: chain_id.clone(),
                currency_symbol: symbol.clone(),
                currency_decimals: decimals.clone(),
                block_explore_url: explorer.clone(),
            };
            session.add_network_manually(&payload).await?;
        }
        Command::Switch {
            chain_id,
            add_if_missing,
        } => {
            let chain_id =
                parse_chain_id(chain_id).ok_or_else(|| anyhow!("invalid chain id '{chain_id}'"))?;
            if *add_if_missing && !session.app().networks().contains(chain_id) {
                return Err(anyhow!(
                    "chain {chain_id} is not in the network list; add it with `sendx add-network`"
                ));
            }
            match session.switch_network(chain_id).await {
                Err(NetworkError::Unrecognized { chain_id, .. }) if *add_if_missing => {
                    flush(session);
                    session.request_add_network(chain_id).await?;
                }
                other => other?,
            }
        }
        Command::Balance => {
            connect(session).await?;
            print_account(session, cfg.balance_digits);
        }
        Command::Send {
            to,
            amount,
            nonce,
            no_wait,
        } => {
            connect(session).await?;
            let payload = {
                let app = session.app();
                let state = app.session();
                TransferPayload {
                    network: state.chain_id.map(|id| id.to_string()).unwrap_or_default(),
                    to: to.clone(),
                    amount: amount.clone(),
                    nonce: nonce.clone().unwrap_or_else(|| state.nonce.to_string()),
                }
            };

            let hash = session.send_transfer(&payload).await?;
            println!("{hash}");
            flush(session);

            if !no_wait {
                log::info!("waiting for {hash} to be mined");
                let (tx, rx) = oneshot::channel();
                let watch = session.mined_watch(hash);
                platform::spawn_local(async move {
                    let _ = tx.send(watch.await);
                });
                match rx.await.context("mined watch dropped")? {
                    AppEvent::TxMined { .. } => print_account(session, cfg.balance_digits),
                    AppEvent::WatchFailed { message, .. } => {
                        return Err(anyhow!("stopped waiting for {hash}: {message}"));
                    }
                }
            }
        }
    }
    Ok(())
}

async fn connect(session: &mut CliSession) -> Result<()> {
    if !session.restore().await? {
        session.connect().await?;
    }
    flush(session);
    Ok(())
}

fn print_account(session: &CliSession, digits: usize) {
    let app = session.app();
    let state = app.session();
    let symbol = state
        .chain_id
        .and_then(|id| app.networks().get(id))
        .map(|n| n.native_currency.symbol.as_str())
        .unwrap_or("ETH");
    if let Some(account) = state.account {
        println!("account  {account}");
    }
    if let Some(chain_id) = state.chain_id {
        println!("chain    {chain_id} ({})", number_to_chain_id(chain_id));
    }
    println!("balance  {} {symbol}", format_balance(state.balance, digits));
    println!("nonce    {}", state.nonce);
    for tx in app.pending() {
        let row = tx.summary();
        println!(
            "pending  #{} -> {} {} (gas {}) {}",
            row.nonce, row.to, row.amount, row.gas_limit, row.hash
        );
    }
}

fn flush(session: &mut CliSession) {
    let mut app = session.app_mut();
    for notice in app.take_notices() {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", notice.message);
        if let Some(NoticeAction::AddNetwork { chain_id }) = notice.action {
            eprintln!("       run `sendx switch {chain_id} --add-if-missing` to add it");
        }
    }
    if app.take_reload() {
        platform::reload_page();
    }
}
