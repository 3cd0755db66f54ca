use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::WebError;
use super::state::AppState;
use crate::gate::GateDecision;
use crate::types::Session;

/// Session that passed the access gate for this request.
///
/// Only available on routes behind [`require_session`].
#[derive(Debug, Clone)]
pub(super) struct CurrentUser(pub(super) Session);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(WebError::Unauthenticated)
    }
}

/// Runs the access gate before any `/api` handler.
pub(super) async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.gate.check().await {
        GateDecision::Authorized { session, .. } => {
            request.extensions_mut().insert(CurrentUser(session));
            next.run(request).await
        }
        GateDecision::Unauthenticated { .. } => WebError::Unauthenticated.into_response(),
    }
}
