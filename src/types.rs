use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Backend user identifier (opaque string issued by the code exchange).
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Locally persisted identity.
///
/// A session is "present" when `user_id` is non-empty. The bearer token is
/// independent of that: the backend may or may not hand one out.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.user_id.is_empty()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Response of `POST /auth/speckle/exchange`.
#[derive(Clone, Default, Deserialize)]
#[non_exhaustive]
pub struct AuthorizationResult {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthorizationResult {
    /// Turns the exchange response into a session, if it names a user.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        let user_id = self.user_id.filter(|id| !id.is_empty())?;
        Some(Session {
            user_id: UserId(user_id),
            email: self.email.unwrap_or_default(),
            display_name: self.name.unwrap_or_default(),
            token: self.token.filter(|t| !t.is_empty()),
        })
    }
}

/// Response of `GET /auth/whoami`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Identity {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Identity {
    /// The backend recognizes a user by returning a non-empty email.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// Response of `GET /auth/check-access`.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct AccessCheck {
    pub access: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `{ status }` answer of the automation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub status: String,
}
