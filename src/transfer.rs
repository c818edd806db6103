//! Transfer lifecycle: validate, fetch fees, submit, track until mined

use alloy_primitives::B256;

use crate::app::{Action, Notice};
use crate::constants::messages;
use crate::error::{ErrorKind, FieldErrors, TransferError};
use crate::provider::WalletProvider;
use crate::session::{fold_mined, Session};
use crate::storage::KeyValueStore;
use crate::types::{Transfer, TransferPayload};
use crate::validate::validate_transfer;

impl<P, S> Session<P, S>
where
    P: WalletProvider + 'static,
    S: KeyValueStore,
{
    /// Submit the transfer currently held in the form.
    pub async fn submit_form(&mut self) -> Result<B256, TransferError> {
        let payload = {
            let app = self.app.borrow();
            let form = app.form();
            TransferPayload {
                network: form.network.clone(),
                to: form.to.clone(),
                amount: form.amount.clone(),
                nonce: form.nonce.clone(),
            }
        };
        self.send_transfer(&payload).await
    }

    /// Send a native-currency transfer with the caller's nonce.
    ///
    /// A transfer naming a network other than the wallet's current chain is
    /// refused with a `network` field error; switch first with
    /// [`Session::select_network`]. On success the pending entry is appended
    /// and stays listed until its mined event (see [`Session::mined_watch`]).
    pub async fn send_transfer(&mut self, payload: &TransferPayload) -> Result<B256, TransferError> {
        if self.app.borrow().is_sending() {
            return Err(TransferError::Busy);
        }
        let Some(from) = self.account() else {
            return Err(TransferError::NotConnected);
        };
        if self.sender.is_none() {
            return Err(TransferError::NotConnected);
        }

        let transfer = match validate_transfer(payload).and_then(|t| self.check_network(t)) {
            Ok(t) => t,
            Err(errors) => {
                self.dispatch(Action::FormInvalid(errors.clone()));
                return Err(TransferError::Invalid(errors));
            }
        };

        self.dispatch(Action::SendStarted);

        let fees = match self.provider.fee_data().await {
            Ok(fees) => fees,
            Err(e) => {
                self.dispatch(Action::SendFailed);
                self.notify(Notice::error(messages::FEE_FAILED));
                return Err(TransferError::FeeData(e));
            }
        };

        let result = match &self.sender {
            Some(sender) => sender.submit(&*self.provider, from, &transfer, &fees).await,
            None => {
                self.dispatch(Action::SendFailed);
                return Err(TransferError::NotConnected);
            }
        };

        match result {
            Ok(submission) => {
                log::info!(
                    "submitted {} (nonce {})",
                    submission.hash,
                    submission.pending.nonce
                );
                self.dispatch(Action::SendSucceeded(submission.pending));
                Ok(submission.hash)
            }
            Err(e) => {
                self.dispatch(Action::SendFailed);
                if e.kind() == ErrorKind::UserRejected {
                    self.notify(Notice::info(messages::TX_REJECTED));
                    Err(TransferError::Rejected(e))
                } else {
                    self.notify(Notice::error(messages::TX_FAILED));
                    Err(TransferError::Send(e))
                }
            }
        }
    }

    /// Mined callback. Ignored unless `hash` matches a pending entry, so it
    /// fires at most once per hash. Returns whether it was handled.
    pub async fn on_mined(&mut self, hash: B256) -> bool {
        fold_mined(&*self.provider, &self.app, hash).await
    }

    fn check_network(&self, transfer: Transfer) -> Result<Transfer, FieldErrors> {
        let wallet_chain = self.app.borrow().session().chain_id;
        let mut errors = FieldErrors::new();
        if transfer.chain_id.is_some_and(|wanted| Some(wanted) != wallet_chain) {
            errors.insert("network", messages::WRONG_NETWORK);
        }
        errors.into_result(transfer)
    }
}
