use serde_json::json;
use url::Url;

use crate::client::{BackendClient, RequestBody};
use crate::error::Error;
use crate::session::SessionStore;
use crate::types::AccessCheck;

const EMBED_FRAGMENT: &str = "embed=%7B%22isEnabled%22%3Atrue%7D";

/// Project/model pair named by a Speckle URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub origin: String,
    pub project_id: String,
    pub model_id: String,
}

impl ModelRef {
    /// Viewer URL with embedding enabled.
    #[must_use]
    pub fn embed_url(&self) -> String {
        format!(
            "{}/projects/{}/models/{}#{EMBED_FRAGMENT}",
            self.origin, self.project_id, self.model_id
        )
    }
}

/// Parses `https://<server>/projects/<project>/models/<model>`.
///
/// # Errors
///
/// [`Error::InvalidInput`] if the text is not a URL or lacks either segment pair.
pub fn parse_model_url(input: &str) -> Result<ModelRef, Error> {
    let url: Url = input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput("invalid URL format".into()))?;

    let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();
    let id_after = |marker: &str| {
        segments
            .iter()
            .position(|s| *s == marker)
            .and_then(|i| segments.get(i + 1))
            .filter(|id| !id.is_empty())
            .map(|id| (*id).to_owned())
    };

    match (id_after("projects"), id_after("models")) {
        (Some(project_id), Some(model_id)) => Ok(ModelRef {
            origin: url.origin().ascii_serialization(),
            project_id,
            model_id,
        }),
        _ => Err(Error::InvalidInput(
            "not a Speckle project/model URL".into(),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModel {
    pub model: ModelRef,
    pub embed_url: String,
}

/// Selects the model shown in the dashboard's embedded viewer.
#[derive(Debug, Clone)]
pub struct ModelViewer {
    sessions: SessionStore,
    backend: BackendClient,
}

impl ModelViewer {
    #[must_use]
    pub fn new(sessions: SessionStore, backend: BackendClient) -> Self {
        Self { sessions, backend }
    }

    /// Embed URL of the model picked earlier, if any.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.sessions.model_url()
    }

    /// Checks the user may open `speckle_url`, points the backend at its
    /// project/model, and remembers the embed URL.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for unparseable URLs, [`Error::AccessDenied`]
    /// when the backend refuses, otherwise any backend or storage error.
    pub async fn load(&self, speckle_url: &str) -> Result<LoadedModel, Error> {
        let model = parse_model_url(speckle_url)?;
        let user_id = self.sessions.user_id();

        let check: AccessCheck = self
            .backend
            .get(
                "/auth/check-access",
                &[("user_id", user_id.as_str()), ("speckle_url", speckle_url.trim())],
            )
            .await?;
        if !check.access {
            let reason = check
                .reason
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "Access denied".into());
            tracing::warn!(project = %model.project_id, %reason, "Model access denied");
            return Err(Error::AccessDenied(reason));
        }

        let _ack: serde_json::Value = self
            .backend
            .post(
                "/set-project",
                &[],
                RequestBody::Json(json!({
                    "project_id": model.project_id,
                    "model_id": model.model_id,
                })),
            )
            .await?;

        let embed_url = model.embed_url();
        self.sessions.set_model_url(&embed_url)?;
        tracing::info!(project = %model.project_id, model = %model.model_id, "Model loaded");
        Ok(LoadedModel { model, embed_url })
    }

    /// Forgets the selected model.
    ///
    /// # Errors
    ///
    /// [`Error::Storage`] if the backing store cannot be written.
    pub fn unload(&self) -> Result<(), Error> {
        self.sessions.clear_model_url()
    }
}
