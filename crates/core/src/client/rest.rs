//! REST client for the cluster API server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, info, instrument};

use super::UserIdentityMappingInterface;
use crate::config::ClientConfig;
use crate::errors::{ApiError, ConfigError};
use crate::models::{Status, UserIdentityMapping, GROUP, RESOURCE, VERSION};

/// Asynchronous client bound to one API server.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    server: String,
    token: Option<String>,
}

impl RestClient {
    /// Build a client from resolved connection settings.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let server = config.cluster.server.trim().trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&config.client.user_agent).map_err(|e| {
            ConfigError::InvalidValue {
                field: "client.user_agent".into(),
                detail: e.to_string(),
            }
        })?;
        headers.insert(USER_AGENT, agent);

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.client.timeout_secs));

        if let Some(ref ca_path) = config.cluster.certificate_authority {
            let pem = std::fs::read(ca_path).map_err(|e| ConfigError::InvalidValue {
                field: "cluster.certificate_authority".into(),
                detail: format!("unable to read '{}': {}", ca_path.display(), e),
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                ConfigError::ClientBuild(format!(
                    "invalid certificate authority '{}': {}",
                    ca_path.display(),
                    e
                ))
            })?;
            builder = builder.add_root_certificate(cert);
        }
        if config.cluster.insecure_skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| ConfigError::ClientBuild(e.to_string()))?;

        info!(server = %server, "created REST client");
        Ok(Self {
            http,
            server,
            token: config.auth.token.clone(),
        })
    }

    /// Base URL of the API server, without a trailing slash.
    pub fn server(&self) -> &str {
        &self.server
    }

    fn collection_url(&self) -> String {
        format!("{}/apis/{}/{}/{}", self.server, GROUP, VERSION, RESOURCE)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.http.post(url).header(CONTENT_TYPE, "application/json");
        match self.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl UserIdentityMappingInterface for RestClient {
    #[instrument(skip(self, mapping), fields(identity = %mapping.identity.name, user = %mapping.user.name))]
    async fn create(
        &self,
        mapping: &UserIdentityMapping,
    ) -> Result<UserIdentityMapping, ApiError> {
        let url = self.collection_url();
        let body = serde_json::to_vec(mapping).map_err(|e| ApiError::Encode(e.to_string()))?;
        let resp = self.post(&url).body(body).send().await?;
        let resp = check_response(resp).await?;

        let bytes = resp.bytes().await?;
        let created: UserIdentityMapping =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
        info!(name = %created.name(), "created useridentitymapping");
        Ok(created)
    }
}

async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let code = status.as_u16();
    let body = response_body(resp.text().await);
    debug!(code, "request failed");
    Err(error_from_body(code, &body))
}

/// Body of a failed response; a read failure is reported in place of it.
fn response_body(text: reqwest::Result<String>) -> String {
    match text {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "failed to read error response body");
            format!("<unable to read response body: {}>", e)
        }
    }
}

/// Map a failed response to an [`ApiError`], preferring the server's
/// structured `Status` message.
fn error_from_body(code: u16, body: &str) -> ApiError {
    if code == 401 {
        return ApiError::Unauthorized;
    }
    match serde_json::from_str::<Status>(body) {
        Ok(status) if status.is_status() => {
            let reason = if status.reason.is_empty() {
                reqwest::StatusCode::from_u16(code)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown")
                    .to_string()
            } else {
                status.reason
            };
            ApiError::Status {
                code,
                reason,
                message: status.message,
            }
        }
        _ => ApiError::UnexpectedResponse {
            code,
            body: body.trim().to_string(),
        },
    }
}
