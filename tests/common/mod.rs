//! Shared test helpers: an in-memory backend that records every request.
#![allow(dead_code)]

use std::sync::Mutex;

use ironlady::api::{ApiError, ApiRequest, Backend, Method};
use serde_json::Value;

type Handler = Box<dyn Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync>;

pub struct MockBackend {
    handler: Handler,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockBackend {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        // Failure events go nowhere during tests.
        ironlady::analytics::events::init(None);
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, method: Method) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.calls().iter().map(|c| c.method).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

impl Backend for MockBackend {
    fn send(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        (self.handler)(request)
    }

    fn base_url(&self) -> &str {
        "http://mock"
    }
}

pub fn server_error(request: &ApiRequest) -> ApiError {
    ApiError::Status {
        method: request.method,
        url: format!("http://mock{}", request.path),
        status: 500,
        body: "boom".into(),
    }
}

pub fn unreachable(request: &ApiRequest) -> ApiError {
    ApiError::Transport {
        url: format!("http://mock{}", request.path),
        message: "connection refused".into(),
    }
}
