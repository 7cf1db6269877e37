//! Blocking HTTP transport built on `ureq`.
//!
//! One [`HttpBackend`] is created per command invocation from the resolved
//! config and shared by every view it drives.
use std::time::Duration;

use serde_json::Value;

use super::{ApiError, ApiRequest, Backend};

/// `ureq`-backed [`Backend`] rooted at a base URL such as
/// `http://localhost:5000/api`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn url_for(&self, path: &str) -> String {
        let url = format!("{}{}", self.base_url, path);
        // "localhost" may resolve to ::1 first and stall when the backend
        // only binds IPv4.
        url.replace("://localhost", "://127.0.0.1")
    }
}

impl Backend for HttpBackend {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = self.url_for(&request.path);

        let mut req = ureq::request(request.method.as_str(), &url)
            .timeout(self.timeout)
            .set("Accept", "application/json");
        for (key, value) in &request.query {
            req = req.query(key, value);
        }

        let result = match &request.body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };

        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(ApiError::Status {
                    method: request.method,
                    url,
                    status,
                    body: body.trim().to_string(),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ApiError::Transport {
                    url,
                    message: transport.to_string(),
                });
            }
        };

        let text = resp.into_string().map_err(|e| ApiError::Transport {
            url: url.clone(),
            message: format!("failed reading response body: {e}"),
        })?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            url,
            message: e.to_string(),
        })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
