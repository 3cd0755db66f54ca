use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;
use crate::session::SessionStore;

/// Body of a backend POST.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized as JSON with `content-type: application/json`.
    Json(serde_json::Value),
    /// Sent as-is; reqwest supplies the multipart boundary header.
    Multipart(Form),
}

/// Client for the automation backend.
///
/// Every request carries `Authorization: Bearer <token>` when the session
/// store holds a token. Non-success responses become [`Error::Backend`]
/// with the raw body text; nothing is retried or logged above `debug`.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base: Url,
    sessions: SessionStore,
    http: reqwest::Client,
}

impl BackendClient {
    #[must_use]
    pub fn new(base: Url, sessions: SessionStore) -> Self {
        Self {
            base,
            sessions,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET origin+path`, decoding the JSON body.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] on transport failure, [`Error::Backend`] on a
    /// non-success status, [`Error::MalformedResponse`] if the body does not
    /// decode as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");

        let request = self.authorize(self.http.get(url).query(query));
        let response = request.send().await?;
        Self::decode(response, path).await
    }

    /// `POST origin+path` with `body`, decoding the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: RequestBody,
    ) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");

        let request = self.authorize(self.http.post(url).query(query));
        let request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };
        let response = request.send().await?;
        Self::decode(response, path).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let origin = self.base.as_str().trim_end_matches('/');
        format!("{origin}{path}")
            .parse()
            .map_err(|e| Error::Config(format!("backend path {path}: {e}")))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.sessions.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Checks the status and decodes the body; the raw text is kept for errors.
    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, Error> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Backend {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| Error::MalformedResponse(format!("{path}: {e}")))
    }
}
