use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the recipe backend, without a trailing slash.
    pub backend_url: String,
    pub http_timeout_secs: u64,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let backend_url = std::env::var("BACKEND_URL")?;
        let http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        Ok(Self::new(backend_url, http_timeout_secs))
    }

    pub fn new(backend_url: impl Into<String>, http_timeout_secs: u64) -> Self {
        let backend_url = backend_url.into().trim_end_matches('/').to_string();
        Self {
            backend_url,
            http_timeout_secs,
        }
    }
}
