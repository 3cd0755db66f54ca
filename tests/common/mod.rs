#![allow(dead_code)]

use std::sync::Arc;

use fls_dashboard::{BackendClient, Config, KeyValueStore, MemoryStore, Session, SessionStore};
use wiremock::MockServer;

/// Mock backend plus an in-memory session store wired to it.
pub struct Fixture {
    pub server: MockServer,
    pub memory: Arc<MemoryStore>,
    pub sessions: SessionStore,
    pub backend: BackendClient,
    pub config: Config,
}

impl Fixture {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let config = Config::new("a9bae48e35", "http://localhost:8080/login".parse().unwrap())
            .with_speckle_server("https://speckle.example.com".parse().unwrap())
            .with_api_base(server.uri().parse().unwrap());

        let memory = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(memory.clone());
        let backend = BackendClient::new(config.api_base().clone(), sessions.clone());

        Self {
            server,
            memory,
            sessions,
            backend,
            config,
        }
    }

    pub fn sign_in(&self, user_id: &str, token: Option<&str>) {
        self.sessions
            .set(&Session {
                user_id: user_id.into(),
                email: "a@b.com".into(),
                display_name: "A".into(),
                token: token.map(str::to_owned),
            })
            .unwrap();
    }

    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        self.memory.clone()
    }
}
