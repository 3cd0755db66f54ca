use std::sync::Arc;

use crate::error::Error;
use crate::storage::KeyValueStore;
use crate::types::{Session, UserId};

pub const USER_ID_KEY: &str = "speckle_user_id";
pub const USER_EMAIL_KEY: &str = "speckle_user_email";
pub const USER_NAME_KEY: &str = "speckle_user_name";
pub const TOKEN_KEY: &str = "speckle_token";
pub const CHALLENGE_KEY: &str = "pkce_challenge";
pub const MODEL_URL_KEY: &str = "speckleUrl";

const IDENTITY_KEYS: [&str; 4] = [USER_ID_KEY, USER_EMAIL_KEY, USER_NAME_KEY, TOKEN_KEY];

/// Typed view of the persisted session, plus the handshake and viewer slots.
///
/// Cheap to clone; every clone shares the same backing store.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Reads the current session. Missing keys read as empty.
    #[must_use]
    pub fn get(&self) -> Session {
        let read = |key| self.storage.get_item(key).unwrap_or_default();
        Session {
            user_id: UserId(read(USER_ID_KEY)),
            email: read(USER_EMAIL_KEY),
            display_name: read(USER_NAME_KEY),
            token: self.token(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId(self.storage.get_item(USER_ID_KEY).unwrap_or_default())
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Replaces the stored session with `session`. A session without a
    /// token removes any stored token. The user id is written last; if any
    /// write fails the identity keys are cleared again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backing store cannot be written.
    pub fn set(&self, session: &Session) -> Result<(), Error> {
        self.write(session).inspect_err(|e| {
            tracing::warn!(error = %e, "Session write failed; clearing partial session");
            if let Err(e) = self.clear() {
                tracing::error!(error = %e, "Failed to clear partial session");
            }
        })
    }

    fn write(&self, session: &Session) -> Result<(), Error> {
        self.storage.set_item(USER_EMAIL_KEY, &session.email)?;
        self.storage.set_item(USER_NAME_KEY, &session.display_name)?;
        match &session.token {
            Some(token) => self.storage.set_item(TOKEN_KEY, token)?,
            None => self.storage.remove_item(TOKEN_KEY)?,
        }
        self.storage.set_item(USER_ID_KEY, session.user_id.as_str())
    }

    /// Removes the four identity keys. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the backing store cannot be written.
    pub fn clear(&self) -> Result<(), Error> {
        for key in IDENTITY_KEYS {
            self.storage.remove_item(key)?;
        }
        Ok(())
    }

    // ── Handshake slot ─────────────────────────────────────────────────

    pub(crate) fn store_challenge(&self, challenge: &str) -> Result<(), Error> {
        self.storage.set_item(CHALLENGE_KEY, challenge)
    }

    /// Reads and removes the pending challenge.
    pub(crate) fn take_challenge(&self) -> Result<Option<String>, Error> {
        let challenge = self
            .storage
            .get_item(CHALLENGE_KEY)
            .filter(|c| !c.is_empty());
        if challenge.is_some() {
            self.storage.remove_item(CHALLENGE_KEY)?;
        }
        Ok(challenge)
    }

    // ── Viewer slot ────────────────────────────────────────────────────

    #[must_use]
    pub fn model_url(&self) -> Option<String> {
        self.storage.get_item(MODEL_URL_KEY).filter(|u| !u.is_empty())
    }

    pub(crate) fn set_model_url(&self, url: &str) -> Result<(), Error> {
        self.storage.set_item(MODEL_URL_KEY, url)
    }

    pub(crate) fn clear_model_url(&self) -> Result<(), Error> {
        self.storage.remove_item(MODEL_URL_KEY)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
