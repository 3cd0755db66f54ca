use url::Url;

use crate::error::Error;

const DEFAULT_SPECKLE_SERVER: &str = "https://app.speckle.systems";
const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_CODE_PARAM: &str = "access_code";

/// Dashboard configuration.
///
/// Required fields are constructor parameters; everything else has a default
/// and a `with_*` override.
///
/// ```rust,ignore
/// use fls_dashboard::Config;
///
/// let config = Config::new("a9bae48e35", "http://localhost:8080/login".parse()?)
///     .with_speckle_server("https://speckle.example.com".parse()?);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    pub(crate) client_id: String,
    pub(crate) redirect_uri: Url,
    pub(crate) speckle_server: Url,
    pub(crate) api_base: Url,
    pub(crate) code_param: String,
}

impl Config {
    #[must_use]
    pub fn new(client_id: impl Into<String>, redirect_uri: Url) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri,
            speckle_server: parse_default(DEFAULT_SPECKLE_SERVER),
            api_base: parse_default(DEFAULT_API_BASE),
            code_param: DEFAULT_CODE_PARAM.into(),
        }
    }

    /// Builds the configuration from environment variables.
    ///
    /// # Required env vars
    /// - `SPECKLE_CLIENT_ID`: application id registered on the Speckle server
    /// - `SPECKLE_REDIRECT_URI`: registered return address (the dashboard's `/login`)
    ///
    /// # Optional env vars
    /// - `SPECKLE_SERVER_URL`: Speckle server origin
    /// - `FLS_API_BASE`: automation backend origin
    /// - `SPECKLE_CODE_PARAM`: query parameter carrying the code on return
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or a URL is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let client_id = std::env::var("SPECKLE_CLIENT_ID")
            .map_err(|_| Error::Config("SPECKLE_CLIENT_ID is required".into()))?;
        let redirect_uri = std::env::var("SPECKLE_REDIRECT_URI")
            .map_err(|_| Error::Config("SPECKLE_REDIRECT_URI is required".into()))?;
        let redirect_uri = parse_env_url("SPECKLE_REDIRECT_URI", &redirect_uri)?;

        let mut config = Self::new(client_id, redirect_uri);

        if let Ok(value) = std::env::var("SPECKLE_SERVER_URL") {
            config = config.with_speckle_server(parse_env_url("SPECKLE_SERVER_URL", &value)?);
        }
        if let Ok(value) = std::env::var("FLS_API_BASE") {
            config = config.with_api_base(parse_env_url("FLS_API_BASE", &value)?);
        }
        if let Ok(value) = std::env::var("SPECKLE_CODE_PARAM") {
            let value = value.trim();
            if value.is_empty() {
                return Err(Error::Config("SPECKLE_CODE_PARAM must not be empty".into()));
            }
            config = config.with_code_param(value);
        }

        Ok(config)
    }

    /// Override the Speckle server (authorization server) origin.
    #[must_use]
    pub fn with_speckle_server(mut self, url: Url) -> Self {
        self.speckle_server = url;
        self
    }

    /// Override the automation backend origin.
    #[must_use]
    pub fn with_api_base(mut self, url: Url) -> Self {
        self.api_base = url;
        self
    }

    /// Override the query parameter that carries the code on return
    /// (default: `access_code`).
    #[must_use]
    pub fn with_code_param(mut self, name: impl Into<String>) -> Self {
        self.code_param = name.into();
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn speckle_server(&self) -> &Url {
        &self.speckle_server
    }

    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    #[must_use]
    pub fn code_param(&self) -> &str {
        &self.code_param
    }
}

fn parse_default(url: &str) -> Url {
    url.parse().expect("valid default URL")
}

fn parse_env_url(var: &str, value: &str) -> Result<Url, Error> {
    value
        .parse()
        .map_err(|e| Error::Config(format!("{var}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_applies_defaults() {
        let config = Config::new("app-id", "http://localhost:8080/login".parse().unwrap());

        assert_eq!(config.client_id(), "app-id");
        assert_eq!(config.redirect_uri().as_str(), "http://localhost:8080/login");
        assert_eq!(config.speckle_server().as_str(), "https://app.speckle.systems/");
        assert_eq!(config.api_base().as_str(), "http://localhost:8000/");
        assert_eq!(config.code_param(), "access_code");
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let config = Config::new("app-id", "http://localhost:8080/login".parse().unwrap())
            .with_speckle_server("https://speckle.example.com".parse().unwrap())
            .with_api_base("http://10.0.0.5:9000".parse().unwrap())
            .with_code_param("code");

        assert_eq!(config.speckle_server().as_str(), "https://speckle.example.com/");
        assert_eq!(config.api_base().as_str(), "http://10.0.0.5:9000/");
        assert_eq!(config.code_param(), "code");
    }
}
