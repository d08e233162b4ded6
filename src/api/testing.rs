use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{ApiRequest, ApiResponse, Body, Transport};
use crate::error::AppError;

type Scripted = Result<ApiResponse, AppError>;

/// Scripted stand-in for the backend. Responses are queued per
/// `METHOD path`; the last queued response keeps answering once the
/// queue is down to one entry.
#[derive(Default)]
pub struct FakeTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn key(method: &Method, path: &str) -> String {
    format!("{} {}", method, path)
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry(key(&method, path))
            .or_default()
            .push_back(scripted);
    }

    pub fn respond_json(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Ok(ApiResponse { status, body: Body::Json(body) }));
    }

    pub fn respond_text(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, Ok(ApiResponse { status, body: Body::Text(body.to_string()) }));
    }

    pub fn fail(&self, method: Method, path: &str) {
        self.fail_with(method, path, AppError::Fetch("connection refused".to_string()));
    }

    pub fn fail_with(&self, method: Method, path: &str, err: AppError) {
        self.push(method, path, Err(err));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AppError> {
        let k = key(&request.method, &request.path);
        self.requests.lock().unwrap().push(request);

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&k) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(AppError::Fetch(format!("nothing scripted for {}", k)))),
            None => Err(AppError::Fetch(format!("nothing scripted for {}", k))),
        }
    }
}
