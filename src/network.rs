//! Network switch and add flows

use crate::app::{Action, Notice, NoticeAction};
use crate::constants::messages;
use crate::error::{ErrorKind, NetworkError, ProviderError};
use crate::provider::WalletProvider;
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::types::NewNetworkPayload;
use crate::validate::validate_new_network;

impl<P, S> Session<P, S>
where
    P: WalletProvider + 'static,
    S: KeyValueStore,
{
    /// Network picked in the transfer form. Selecting a chain other than the
    /// wallet's current one asks the wallet to switch.
    pub async fn select_network(&mut self, chain_id: u64) -> Result<(), NetworkError> {
        self.dispatch(Action::SelectNetwork(chain_id.to_string()));
        let current = self.app.borrow().session().chain_id;
        if current == Some(chain_id) {
            return Ok(());
        }
        self.switch_network(chain_id).await
    }

    /// Ask the wallet to switch chains. An unknown chain yields an error notice
    /// carrying an add-network action for the same id.
    pub async fn switch_network(&mut self, chain_id: u64) -> Result<(), NetworkError> {
        match self.provider.switch_chain(chain_id).await {
            Ok(()) => {
                self.dispatch(Action::ChainChanged(chain_id));
                self.notify(Notice::success(messages::SWITCH_OK));
                self.dispatch(Action::RequestReload);
                Ok(())
            }
            Err(e) => match e.kind() {
                ErrorKind::UnrecognizedChain => {
                    self.notify(
                        Notice::error(messages::SWITCH_UNRECOGNIZED)
                            .with_action(NoticeAction::AddNetwork { chain_id }),
                    );
                    Err(NetworkError::Unrecognized {
                        chain_id,
                        source: e,
                    })
                }
                ErrorKind::UserRejected => {
                    self.notify(Notice::info(messages::SWITCH_REJECTED));
                    Err(NetworkError::Rejected(e))
                }
                _ => {
                    self.notify(Notice::error(messages::SWITCH_FAILED));
                    Err(NetworkError::Provider(e))
                }
            },
        }
    }

    /// Offer a registry network to the wallet.
    pub async fn request_add_network(&mut self, chain_id: u64) -> Result<(), NetworkError> {
        let network = self.app.borrow().networks().get(chain_id).cloned();
        let Some(network) = network else {
            self.notify(Notice::error(messages::ADD_FAILED));
            return Err(NetworkError::UnknownNetwork(chain_id));
        };

        match self.provider.add_chain(&network.to_chain_info()).await {
            Ok(()) => {
                self.notify(Notice::success(format!(
                    "Network {} has been added",
                    network.chain_name
                )));
                self.dispatch(Action::RequestReload);
                Ok(())
            }
            Err(e) => Err(self.add_failed(e)),
        }
    }

    /// Validate a user-entered network and add it to the wallet, then to the
    /// registry. Validation failures never reach the wallet.
    pub async fn add_network_manually(
        &mut self,
        payload: &NewNetworkPayload,
    ) -> Result<(), NetworkError> {
        let network = validate_new_network(payload).map_err(NetworkError::Invalid)?;

        match self.provider.add_chain(&network.to_chain_info()).await {
            Ok(()) => {
                let name = network.chain_name.clone();
                self.dispatch(Action::CloseNetworkForm);
                self.dispatch(Action::NetworkAdded(network));
                let persisted = self.app.borrow().networks().persist(&self.store);
                if let Err(e) = persisted {
                    log::warn!("failed to persist network list: {e:#}");
                }
                self.notify(Notice::success(format!("Network {name} has been added")));
                Ok(())
            }
            Err(e) => Err(self.add_failed(e)),
        }
    }

    fn add_failed(&mut self, e: ProviderError) -> NetworkError {
        if e.kind() == ErrorKind::UserRejected {
            self.notify(Notice::info(messages::ADD_REJECTED));
            return NetworkError::Rejected(e);
        }
        let message = e.message_or(messages::ADD_FAILED).to_string();
        self.notify(Notice::error(message));
        NetworkError::Provider(e)
    }
}
