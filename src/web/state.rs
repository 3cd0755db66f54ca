use std::sync::Arc;

use crate::client::BackendClient;
use crate::config::Config;
use crate::dashboard::{Automation, ModelViewer};
use crate::gate::AccessGate;
use crate::handshake::LoginFlow;
use crate::session::SessionStore;
use crate::storage::KeyValueStore;

/// Shared state for dashboard route handlers.
#[derive(Clone)]
pub(super) struct AppState {
    pub(super) sessions: SessionStore,
    pub(super) login: Arc<LoginFlow>,
    pub(super) gate: Arc<AccessGate>,
    pub(super) automation: Arc<Automation>,
    pub(super) viewer: Arc<ModelViewer>,
}

impl AppState {
    /// Wires every component to the same storage and backend client.
    pub(super) fn new(config: Config, storage: Arc<dyn KeyValueStore>) -> Self {
        let sessions = SessionStore::new(storage);
        let backend = BackendClient::new(config.api_base().clone(), sessions.clone());

        Self {
            login: Arc::new(LoginFlow::new(config, sessions.clone(), backend.clone())),
            gate: Arc::new(AccessGate::new(sessions.clone(), backend.clone())),
            automation: Arc::new(Automation::new(backend.clone())),
            viewer: Arc::new(ModelViewer::new(sessions.clone(), backend)),
            sessions,
        }
    }
}
