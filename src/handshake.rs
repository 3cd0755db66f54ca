//! Speckle login handshake.
//!
//! ```text
//! Idle ── initiate ──▶ ChallengeIssued ──▶ AwaitingRedirectReturn
//!                                                  │ (browser returns with code)
//!                                                  ▼
//!                      Failed ◀── resume ──▶ Exchanging ──▶ Authenticated
//! ```
//!
//! The stored challenge is the only state that survives the redirect.

use serde_json::json;
use url::Url;

use crate::client::{BackendClient, RequestBody};
use crate::config::Config;
use crate::error::Error;
use crate::pkce::ProofChallenge;
use crate::session::SessionStore;
use crate::types::{AuthorizationResult, Session};

const EXCHANGE_PATH: &str = "/auth/speckle/exchange";

#[derive(Debug)]
#[non_exhaustive]
pub enum HandshakeState {
    /// No code in the request; the login page offers "Authenticate".
    Idle,
    ChallengeIssued,
    /// The browser is being sent to the authorization server.
    AwaitingRedirectReturn { authorize_url: Url },
    Exchanging,
    Authenticated(Session),
    Failed(Error),
}

impl HandshakeState {
    /// Stable name used in log fields.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ChallengeIssued => "ChallengeIssued",
            Self::AwaitingRedirectReturn { .. } => "AwaitingRedirectReturn",
            Self::Exchanging => "Exchanging",
            Self::Authenticated(_) => "Authenticated",
            Self::Failed(_) => "Failed",
        }
    }
}

/// Records entering `state`, returning it unchanged.
fn enter(state: HandshakeState) -> HandshakeState {
    tracing::debug!(state = state.name(), "Login handshake transition");
    state
}

/// Drives [`HandshakeState`] transitions for one login attempt.
#[derive(Debug, Clone)]
pub struct LoginFlow {
    config: Config,
    sessions: SessionStore,
    backend: BackendClient,
}

impl LoginFlow {
    #[must_use]
    pub fn new(config: Config, sessions: SessionStore, backend: BackendClient) -> Self {
        Self {
            config,
            sessions,
            backend,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generates a proof-key pair, persists the challenge, and returns the
    /// authorization URL to send the browser to.
    ///
    /// # Errors
    ///
    /// [`Error::Storage`] if the challenge cannot be persisted,
    /// [`Error::Config`] if the server URL cannot take path segments.
    pub fn initiate(&self) -> Result<HandshakeState, Error> {
        let pair = ProofChallenge::generate();
        self.sessions.store_challenge(&pair.challenge)?;
        enter(HandshakeState::ChallengeIssued);

        let authorize_url = self.authorize_url(&pair.challenge)?;
        tracing::info!(server = %self.config.speckle_server, "Redirecting to Speckle login");
        Ok(enter(HandshakeState::AwaitingRedirectReturn { authorize_url }))
    }

    /// `<server>/authn/verify/<client_id>/<challenge>?redirect_uri=<return>`
    fn authorize_url(&self, challenge: &str) -> Result<Url, Error> {
        let mut url = self.config.speckle_server.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config("SPECKLE_SERVER_URL cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["authn", "verify", self.config.client_id.as_str(), challenge]);
        url.query_pairs_mut()
            .append_pair("redirect_uri", self.config.redirect_uri.as_str());
        Ok(url)
    }

    /// Handles a return to the login page.
    ///
    /// `code` is the value of the configured code query parameter, if any.
    /// Never fails: errors land in [`HandshakeState::Failed`], and nothing
    /// is written to the session unless the exchange names a user.
    pub async fn resume(&self, code: Option<&str>) -> HandshakeState {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return HandshakeState::Idle;
        };

        let challenge = match self.sessions.take_challenge() {
            Ok(Some(challenge)) => challenge,
            Ok(None) => {
                tracing::warn!("Login code received but no challenge is stored");
                return HandshakeState::Failed(Error::LostChallenge);
            }
            Err(e) => return HandshakeState::Failed(e),
        };

        enter(HandshakeState::Exchanging);
        match self.exchange(code, &challenge).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user_id, "Speckle login successful");
                enter(HandshakeState::Authenticated(session))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login code exchange failed");
                enter(HandshakeState::Failed(e))
            }
        }
    }

    async fn exchange(&self, code: &str, challenge: &str) -> Result<Session, Error> {
        let result: AuthorizationResult = self
            .backend
            .post(
                EXCHANGE_PATH,
                &[],
                RequestBody::Json(json!({ "code": code, "challenge": challenge })),
            )
            .await?;

        let session = result
            .into_session()
            .ok_or_else(|| Error::MalformedResponse("exchange response has no user_id".into()))?;
        self.sessions.set(&session)?;
        Ok(session)
    }
}
