//! Scripted transport for exercising the client without a network.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::transport::{HttpRequest, HttpResponse, Transport};
use super::ApiError;

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync>;

/// Answers every request with `handler` and records what was sent.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    delays: Vec<(String, Duration)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            delays: Vec::new(),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Hold responses for URLs ending in `path` for `delay`.
    pub fn with_delay(self: Arc<Self>, path: &str, delay: Duration) -> Arc<Self> {
        let mut this = Arc::try_unwrap(self)
            .unwrap_or_else(|_| panic!("with_delay must be called before the transport is shared"));
        this.delays.push((path.to_string(), delay));
        Arc::new(this)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_path(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = self
            .delays
            .iter()
            .find(|(path, _)| request.url.ends_with(path))
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&request)
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        content_type: Some("application/json".to_string()),
        body: body.to_string().into_bytes(),
    }
}

pub(crate) fn status_response(status: u16) -> HttpResponse {
    HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        content_type: None,
        body: Vec::new(),
    }
}
