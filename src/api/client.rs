use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::envelope::{ApiEnvelope, RawEnvelope};
use crate::error::{ApiFailure, AppError};

/// Thin JSON client over the ranking API. One attempt per call: no retries,
/// no backoff; the caller decides what to do with a failure.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let url = Url::parse(base_url)?;
        Ok(Self {
            http: Client::new(),
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
        fallback_message: &str,
    ) -> Result<ApiEnvelope<T>, ApiFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(self.endpoint(path)).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.execute(request, path, fallback_message).await
    }

    pub async fn get_json<T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        fallback_message: &str,
    ) -> Result<ApiEnvelope<T>, ApiFailure>
    where
        T: DeserializeOwned,
    {
        let mut request = self.http.get(self.endpoint(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.execute(request, path, fallback_message).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
        fallback_message: &str,
    ) -> Result<ApiEnvelope<T>, ApiFailure> {
        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", path, e);
            ApiFailure::new(fallback_message, None)
        })?;

        let status = response.status();
        let code = status.as_u16();
        debug!("{} answered {}", path, code);

        let body = response.text().await.map_err(|e| {
            warn!("Failed to read response body from {}: {}", path, e);
            ApiFailure::new(fallback_message, Some(code))
        })?;

        let raw = if body.trim().is_empty() {
            RawEnvelope::default()
        } else {
            match serde_json::from_str::<RawEnvelope>(&body) {
                Ok(raw) => raw,
                Err(e) if status.is_success() => {
                    warn!("Malformed response from {}: {}", path, e);
                    return Err(ApiFailure::new(fallback_message, Some(code)));
                }
                Err(_) => RawEnvelope::default(),
            }
        };

        if status.is_success() && raw.is_success() {
            let data = raw.payload::<T>().map_err(|e| {
                warn!("Unexpected payload from {}: {}", path, e);
                ApiFailure::new(fallback_message, Some(code))
            })?;
            return Ok(ApiEnvelope::ok(data, raw.message_text()));
        }

        let message = raw
            .message_text()
            .unwrap_or_else(|| fallback_message.to_string());
        Err(ApiFailure::new(message, Some(code)).with_field_errors(raw.errors.unwrap_or_default()))
    }
}
