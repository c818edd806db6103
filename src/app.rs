//! Application state and its reducer
//!
//! All mutation goes through [`App::apply`]; the session performs wallet I/O and
//! folds the results in as [`Action`]s. Front ends read the state and drain
//! notices and the reload request after each step.

use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};

use crate::error::FieldErrors;
use crate::registry::NetworkRegistry;
use crate::types::{ChainDescriptor, PendingTransaction};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub connected: bool,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub balance: U256,
    pub nonce: u64,
}

/// Editable transfer form fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub network: String,
    pub to: String,
    pub amount: String,
    pub nonce: String,
    pub errors: FieldErrors,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Inline action attached to a notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeAction {
    AddNetwork { chain_id: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub action: Option<NoticeAction>,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            action: None,
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn with_action(mut self, action: NoticeAction) -> Self {
        self.action = Some(action);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Connected { account: Address, chain_id: u64 },
    Disconnected,
    BalanceFetched(U256),
    NonceFetched(u64),
    ChainChanged(u64),
    SelectNetwork(String),
    FormInvalid(FieldErrors),
    SendStarted,
    SendFailed,
    SendSucceeded(PendingTransaction),
    TxMined(B256),
    OpenNetworkForm,
    CloseNetworkForm,
    NetworkAdded(ChainDescriptor),
    Notify(Notice),
    RequestReload,
}

pub struct App {
    session: SessionState,
    form: TransferForm,
    pending: Vec<PendingTransaction>,
    networks: NetworkRegistry,
    is_sending: bool,
    network_form_open: bool,
    notices: Vec<Notice>,
    reload_requested: bool,
}

impl App {
    pub fn new(networks: NetworkRegistry) -> Self {
        Self {
            session: SessionState::default(),
            form: TransferForm::default(),
            pending: Vec::new(),
            networks,
            is_sending: false,
            network_form_open: false,
            notices: Vec::new(),
            reload_requested: false,
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Connected { account, chain_id } => {
                self.session.connected = true;
                self.session.account = Some(account);
                self.session.chain_id = Some(chain_id);
                self.form.network = chain_id.to_string();
            }
            Action::Disconnected => {
                self.session = SessionState::default();
                self.is_sending = false;
            }
            Action::BalanceFetched(balance) => self.session.balance = balance,
            Action::NonceFetched(nonce) => {
                self.session.nonce = nonce;
                // keep the form in step with the wallet; other fields untouched
                self.form.nonce = nonce.to_string();
            }
            Action::ChainChanged(chain_id) => {
                self.session.chain_id = Some(chain_id);
                self.form.network = chain_id.to_string();
            }
            Action::SelectNetwork(network) => self.form.network = network,
            Action::FormInvalid(errors) => self.form.errors = errors,
            Action::SendStarted => {
                self.is_sending = true;
                self.form.errors = FieldErrors::default();
            }
            Action::SendFailed => self.is_sending = false,
            Action::SendSucceeded(tx) => {
                self.is_sending = false;
                self.form.to.clear();
                self.form.amount.clear();
                self.pending.push(tx);
            }
            Action::TxMined(hash) => {
                if let Some(idx) = self.pending.iter().position(|t| t.hash == Some(hash)) {
                    self.pending.remove(idx);
                }
            }
            Action::OpenNetworkForm => self.network_form_open = true,
            Action::CloseNetworkForm => self.network_form_open = false,
            Action::NetworkAdded(network) => {
                self.networks.upsert(network);
            }
            Action::Notify(notice) => {
                match notice.level {
                    NoticeLevel::Error => log::warn!("{}", notice.message),
                    _ => log::info!("{}", notice.message),
                }
                self.notices.push(notice);
            }
            Action::RequestReload => self.reload_requested = true,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn form(&self) -> &TransferForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TransferForm {
        &mut self.form
    }

    pub fn pending(&self) -> &[PendingTransaction] {
        &self.pending
    }

    pub fn is_pending(&self, hash: &B256) -> bool {
        self.pending.iter().any(|t| t.hash.as_ref() == Some(hash))
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    pub fn is_sending(&self) -> bool {
        self.is_sending
    }

    pub fn network_form_open(&self) -> bool {
        self.network_form_open
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// True once, after a flow asked for a full resync of chain state.
    pub fn take_reload(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }
}
