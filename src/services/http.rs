//! Shared HTTP plumbing for the API-backed services.

use std::time::Duration;

use super::ServiceError;

/// Build a client with a per-request timeout.
///
/// Falls back to a default (no-timeout) client if the builder fails; the
/// stage timeout still bounds the call.
pub(crate) fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Attach `Authorization: Bearer …` only when `api_key` is a non-empty string.
pub(crate) fn authorize(
    req: reqwest::RequestBuilder,
    api_key: Option<&str>,
) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) if !key.is_empty() => req.bearer_auth(key),
        _ => req,
    }
}

/// Send `req` and decode a JSON body, mapping non-2xx statuses to
/// [`ServiceError::Status`].
pub(crate) async fn send_json(
    req: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ServiceError> {
    let response = req.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }
    response
        .json()
        .await
        .map_err(|e| ServiceError::Parse(e.to_string()))
}

/// Extract a non-empty, trimmed string from `value`.
pub(crate) fn non_empty_str(value: &serde_json::Value) -> Result<String, ServiceError> {
    let text = value.as_str().ok_or(ServiceError::EmptyResponse)?.trim();
    if text.is_empty() {
        return Err(ServiceError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Join `base_url` and `path` without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
