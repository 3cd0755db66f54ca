use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::{Notice, WebError};
use super::extractor::{CurrentUser, require_session};
use super::pages;
use super::state::AppState;
use crate::config::Config;
use crate::dashboard::{FloorWizard, PdfUpload, WizardStep};
use crate::gate::GateDecision;
use crate::handshake::HandshakeState;
use crate::storage::KeyValueStore;

/// Create the dashboard router.
pub fn router(config: Config, storage: Arc<dyn KeyValueStore>) -> Router {
    let state = AppState::new(config, storage);

    let api = Router::new()
        .route("/pdfs", get(list_pdfs).post(upload_pdf))
        .route("/floors", get(floors))
        .route("/run/grid", post(run_grid))
        .route("/run/paths", post(run_paths))
        .route("/run/fls", post(run_fls))
        .route("/model", post(load_model).delete(unload_model))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/login/start", get(login_start))
        .route("/logout", get(logout).post(logout))
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let code = params.get(state.login.config().code_param()).map(String::as_str);

    match state.login.resume(code).await {
        HandshakeState::Authenticated(_) => Redirect::to("/").into_response(),
        HandshakeState::Failed(e) => login_error(&e.to_string()),
        _ => pages::login(params.get("error").map(String::as_str)),
    }
}

async fn login_start(State(state): State<AppState>) -> Response {
    match state.login.initiate() {
        Ok(HandshakeState::AwaitingRedirectReturn { authorize_url }) => {
            Redirect::to(authorize_url.as_str()).into_response()
        }
        Ok(_) => Redirect::to("/login").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start login");
            login_error(&e.to_string())
        }
    }
}

async fn logout(State(state): State<AppState>) -> Result<Redirect, WebError> {
    state.sessions.clear()?;
    tracing::info!("Logged out");
    Ok(Redirect::to("/login"))
}

// ── Dashboard page ─────────────────────────────────────────────────

async fn index(State(state): State<AppState>) -> Response {
    let session = match state.gate.check().await {
        GateDecision::Authorized { session, .. } => session,
        GateDecision::Unauthenticated { .. } => return Redirect::to("/login").into_response(),
    };

    let pdfs = state.automation.list_pdfs().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load PDFs");
        Vec::new()
    });
    let model_url = state.viewer.current();
    pages::dashboard(&session, &pdfs, model_url.as_deref())
}

async fn not_found() -> Response {
    pages::not_found()
}

/// Back to the login page with the failure in the query string, so a
/// refresh does not replay a spent code.
fn login_error(message: &str) -> Response {
    let encoded = urlencoding::encode(message);
    Redirect::to(&format!("/login?error={encoded}")).into_response()
}

// ── API ────────────────────────────────────────────────────────────

async fn list_pdfs(State(state): State<AppState>) -> Result<Json<Value>, WebError> {
    let pdfs = state.automation.list_pdfs().await?;
    Ok(Json(json!({ "pdfs": pdfs })))
}

async fn upload_pdf(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<Value>, WebError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("pdf") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.pdf").to_owned();
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::BadRequest(e.to_string()))?;
        upload = Some(PdfUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or_else(|| WebError::BadRequest("missing multipart field `pdf`".into()))?;

    tracing::debug!(user_id = %user.user_id, file = %upload.file_name, "PDF upload requested");
    let outcome = state.automation.upload_pdf(upload).await?;
    Ok(Json(json!({
        "title": "Upload Complete",
        "description": outcome.status.status,
        "pdfs": outcome.pdfs,
    })))
}

async fn floors(State(state): State<AppState>) -> Result<Json<Value>, WebError> {
    let floors = state.automation.floors().await?;
    Ok(Json(json!({ "floors": floors })))
}

async fn run_grid(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Notice>, WebError> {
    tracing::info!(user_id = %user.user_id, "Grid generation requested");
    let job = state.automation.run_grid().await?;
    Ok(Json(Notice::new("Grid Generated", job.status)))
}

#[derive(Deserialize)]
struct FlsParams {
    #[serde(default)]
    pdf_id: String,
}

async fn run_fls(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<FlsParams>,
) -> Result<Json<Notice>, WebError> {
    tracing::info!(user_id = %user.user_id, pdf_id = %params.pdf_id, "FLS check requested");
    let job = state.automation.run_fls(&params.pdf_id).await?;
    Ok(Json(Notice::new("FLS Check Complete", job.status)))
}

#[derive(Deserialize)]
struct FloorText {
    #[serde(default)]
    doors: String,
    #[serde(default)]
    stairs: String,
}

/// Walks the backend's floors through the wizard with the submitted text,
/// then saves the inputs and runs path computation.
async fn run_paths(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut body): Json<HashMap<String, FloorText>>,
) -> Result<Json<Notice>, WebError> {
    let mut wizard = FloorWizard::new(state.automation.floors().await?)?;
    let inputs = loop {
        if let Some(text) = body.remove(wizard.current_floor()) {
            wizard.set_doors(text.doors);
            wizard.set_stairs(text.stairs);
        }
        match wizard.next()? {
            WizardStep::Advanced { .. } => continue,
            WizardStep::Finished(inputs) => break inputs,
        }
    };

    tracing::info!(user_id = %user.user_id, "Path computation requested");
    let job = state.automation.compute_paths(&inputs).await?;
    let description = if job.status.is_empty() {
        "Shortest paths generated successfully".to_owned()
    } else {
        job.status
    };
    Ok(Json(Notice::new("Paths Computed", description)))
}

#[derive(Deserialize)]
struct ModelRequest {
    url: String,
}

async fn load_model(
    State(state): State<AppState>,
    Json(request): Json<ModelRequest>,
) -> Result<Json<Value>, WebError> {
    let loaded = state.viewer.load(&request.url).await?;
    Ok(Json(json!({
        "project_id": loaded.model.project_id,
        "model_id": loaded.model.model_id,
        "embed_url": loaded.embed_url,
    })))
}

async fn unload_model(State(state): State<AppState>) -> Result<StatusCode, WebError> {
    state.viewer.unload()?;
    Ok(StatusCode::NO_CONTENT)
}
