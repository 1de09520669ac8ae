//! Shared HTTP client, SSE parsing, and auth headers.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::error::{LangrigError, ProviderErrorDetails, Result};

use super::DeltaStream;

/// Time allowed to establish a connection. Request and stream deadlines come
/// from the caller's [`CallContext`](crate::context::CallContext).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the reqwest client used by a provider instance.
///
/// No total timeout is set, so long-running streams are not cut off.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| LangrigError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str, organization: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    if let Some(org) = organization {
        if let Ok(val) = HeaderValue::from_str(org) {
            headers.insert("OpenAI-Organization", val);
        }
    }
    headers
}

/// Build Azure-style headers (api-key).
pub fn azure_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(api_key) {
        headers.insert("api-key", val);
    }
    headers
}

/// A meaningful SSE line.
#[derive(Debug, PartialEq, Eq)]
pub enum SseLine<'a> {
    Data(&'a str),
    /// The `[DONE]` terminator.
    Done,
}

/// Parse one SSE line. Comments, blank lines and non-data fields yield `None`.
pub fn parse_sse_data(line: &str) -> Option<SseLine<'_>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return Some(SseLine::Done);
    }
    Some(SseLine::Data(data))
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> LangrigError {
    let details = ProviderErrorDetails::from_body(body);
    let message = details
        .as_ref()
        .map(|d| d.message.clone())
        .unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => LangrigError::Authentication(message),
        429 => LangrigError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => LangrigError::Api {
            status,
            message,
            details,
        },
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

/// Check the status and hand back the response, or turn it into an error.
pub async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(status_to_error(status.as_u16(), &body))
}

/// Turn an SSE response body into a stream of decoded JSON events.
///
/// The stream ends at `[DONE]` or when the body ends. A malformed event or an
/// in-band error object ends the stream with an error.
pub fn sse_json_stream<T>(resp: reqwest::Response) -> DeltaStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let byte_stream = resp.bytes_stream();

    let stream = async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();
        futures::pin_mut!(byte_stream);

        loop {
            let chunk = byte_stream.next().await;
            let at_end = chunk.is_none();
            match chunk {
                Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    yield Err(LangrigError::Network(e));
                    return;
                }
                None => buffer.push(b'\n'),
            }

            while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim();
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }

                match parse_sse_data(line) {
                    Some(SseLine::Done) => return,
                    Some(SseLine::Data(data)) => match decode_event::<T>(data) {
                        Ok(event) => yield Ok(event),
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    },
                    None => {}
                }
            }

            if at_end {
                return;
            }
        }
    };

    Box::pin(stream)
}

fn decode_event<T: DeserializeOwned>(data: &str) -> Result<T> {
    if data.contains("\"error\"") {
        if let Some(details) = ProviderErrorDetails::from_body(data) {
            return Err(LangrigError::Api {
                status: 200,
                message: details.message.clone(),
                details: Some(details),
            });
        }
    }
    Ok(serde_json::from_str::<T>(data)?)
}
