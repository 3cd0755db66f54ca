use crate::client::BackendClient;
use crate::error::Error;
use crate::session::SessionStore;
use crate::types::{Identity, Session};

const WHOAMI_PATH: &str = "/auth/whoami";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The stored user is recognized; render protected content.
    Authorized { session: Session, identity: Identity },
    /// Send the user to `/login`. `cleared` tells whether the stored
    /// session was dropped on the way.
    Unauthenticated { cleared: bool },
}

impl GateDecision {
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }
}

/// Validates the stored identity before protected content is served.
#[derive(Debug, Clone)]
pub struct AccessGate {
    sessions: SessionStore,
    backend: BackendClient,
}

impl AccessGate {
    #[must_use]
    pub fn new(sessions: SessionStore, backend: BackendClient) -> Self {
        Self { sessions, backend }
    }

    /// Runs one check.
    ///
    /// - no stored user: unauthenticated, no backend call
    /// - backend recognizes the user: authorized, storage untouched
    /// - backend rejects the user: session cleared, unauthenticated
    /// - transient failure: unauthenticated, session kept for the next try
    pub async fn check(&self) -> GateDecision {
        let session = self.sessions.get();
        if !session.is_present() {
            tracing::debug!("No stored user; login required");
            return GateDecision::Unauthenticated { cleared: false };
        }

        let lookup: Result<Identity, Error> = self
            .backend
            .get(WHOAMI_PATH, &[("user_id", session.user_id.as_str())])
            .await;

        match lookup {
            Ok(identity) if identity.is_recognized() => {
                tracing::debug!(user_id = %session.user_id, "Stored user validated");
                GateDecision::Authorized { session, identity }
            }
            Ok(_) => self.reject(&session, "user not recognized"),
            Err(e) if e.is_explicit_rejection() => self.reject(&session, &e.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "User validation failed; keeping stored session");
                GateDecision::Unauthenticated { cleared: false }
            }
        }
    }

    fn reject(&self, session: &Session, reason: &str) -> GateDecision {
        tracing::warn!(user_id = %session.user_id, reason, "Stored user rejected; clearing session");
        let cleared = match self.sessions.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to clear rejected session");
                false
            }
        };
        GateDecision::Unauthenticated { cleared }
    }
}
