#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level failure (connection refused, reset, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status. `body` is the raw response text.
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// A code came back from the authorization server but no challenge was stored for it.
    #[error("login challenge missing; start the login again")]
    LostChallenge,
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("no floor graphs found to compute paths")]
    NoFloors,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the backend positively refused the request, as opposed to a
    /// transient failure. 4xx responses count, except request timeout (408)
    /// and rate limiting (429).
    #[must_use]
    pub fn is_explicit_rejection(&self) -> bool {
        matches!(
            self,
            Self::Backend { status, .. }
                if (400..500).contains(status) && !matches!(status, 408 | 429)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_explicit_rejections() {
        let err = Error::Backend {
            status: 404,
            body: "unknown user".into(),
        };
        assert!(err.is_explicit_rejection());
    }

    #[test]
    fn test_server_errors_are_transient() {
        let err = Error::Backend {
            status: 503,
            body: String::new(),
        };
        assert!(!err.is_explicit_rejection());
        assert!(!Error::MalformedResponse("eof".into()).is_explicit_rejection());
    }

    #[test]
    fn test_timeouts_and_rate_limits_are_transient() {
        for status in [408, 429] {
            let err = Error::Backend {
                status,
                body: String::new(),
            };
            assert!(!err.is_explicit_rejection(), "{status}");
        }
    }

    #[test]
    fn test_backend_error_message_carries_body() {
        let err = Error::Backend {
            status: 500,
            body: "grid script crashed".into(),
        };
        assert_eq!(err.to_string(), "backend returned 500: grid script crashed");
    }
}
