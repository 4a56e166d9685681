//! Executes an `HttpRequest` over the wire using ureq.
//!
//! Automatic status-code-as-error behavior is disabled on the agent so
//! 4xx/5xx responses come back as data rather than `Err`, letting the
//! client layer interpret the status. Only genuine transport failures
//! surface as `ApiError::Transport`.

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Build the agent a `Session` executes its requests with.
pub(crate) fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Perform one HTTP round-trip.
pub(crate) fn execute(agent: &ureq::Agent, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
    debug!(method = ?request.method, path = %request.path, "executing request");

    let mut response = match (&request.method, request.body.as_deref()) {
        (HttpMethod::Get, _) => {
            let mut builder = agent.get(&request.path);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        (HttpMethod::Delete, _) => {
            let mut builder = agent.delete(&request.path);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        (HttpMethod::Post, body) => {
            let mut builder = agent.post(&request.path);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
        (HttpMethod::Put, body) => {
            let mut builder = agent.put(&request.path);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    }
    .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    let reason = status.canonical_reason().unwrap_or_default().to_string();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse {
        status: status.as_u16(),
        reason,
        headers,
        body,
    })
}
