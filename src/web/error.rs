use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::Error;

/// Transient message shown to the user, as `{ "title", "description" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Errors returned by the dashboard API.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The access gate did not let the request through.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The request itself was unusable (bad multipart body, missing field).
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Dashboard(#[from] Error),
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Dashboard(e) => match e {
                Error::AccessDenied(_) => StatusCode::FORBIDDEN,
                Error::InvalidInput(_) | Error::InvalidUpload(_) | Error::LostChallenge => {
                    StatusCode::BAD_REQUEST
                }
                Error::NoFloors => StatusCode::NOT_FOUND,
                Error::Http(_) | Error::Backend { .. } | Error::MalformedResponse(_) => {
                    StatusCode::BAD_GATEWAY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Dashboard request failed");
        } else {
            tracing::debug!(error = %self, "Dashboard request rejected");
        }

        let title = match &self {
            Self::Dashboard(Error::AccessDenied(_)) => "Access Denied",
            Self::Dashboard(Error::NoFloors) => "No Graphs",
            Self::Dashboard(Error::InvalidUpload(_)) => "Invalid File",
            _ => "Error",
        };
        (status, Json(Notice::new(title, self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses_follow_error_kind() {
        assert_eq!(WebError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            WebError::from(Error::AccessDenied("owner only".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WebError::from(Error::Backend {
                status: 500,
                body: "boom".into()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            WebError::from(Error::Storage("disk full".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
