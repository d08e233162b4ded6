mod http;
#[cfg(test)]
pub mod testing;

pub use http::HttpTransport;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{votes_from_values, Credentials, LoginReply, NewVote, StatsSnapshot, Vote, VoteUpdate};

/// How admin calls present the stored token. One scheme is used for every
/// authenticated endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    #[default]
    Bearer,
    AdminTokenHeader,
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(AuthScheme::Bearer),
            "x-admin-token" => Ok(AuthScheme::AdminTokenHeader),
            other => Err(format!("Unknown admin auth scheme: {}", other)),
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Bearer => f.write_str("bearer"),
            AuthScheme::AdminTokenHeader => f.write_str("x-admin-token"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auth {
    pub scheme: AuthScheme,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub auth: Option<Auth>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// The backend's `message` field, when the body is JSON and carries one.
    pub fn message(&self) -> Option<&str> {
        self.json()
            .and_then(|v| v.get("message"))
            .and_then(|m| m.as_str())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AppError>;
}

/// Typed access to the campaign backend. Every endpoint goes through
/// `execute`, so transport failures surface the same way everywhere.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    auth_scheme: AuthScheme,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, auth_scheme: AuthScheme) -> Self {
        Self { transport, auth_scheme }
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth_scheme
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<ApiResponse, AppError> {
        let request = ApiRequest {
            method: method.clone(),
            path: path.to_string(),
            auth: token.map(|t| Auth { scheme: self.auth_scheme, token: t.to_string() }),
            body,
        };
        debug!("{} {}", method, path);

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("{} {} failed: {}", method, path, e);
            e
        })?;

        if !response.is_success() {
            warn!("{} {} returned HTTP {}", method, path, response.status);
        }
        Ok(response)
    }

    pub async fn submit_vote(&self, vote: &NewVote) -> Result<(), AppError> {
        let response = self
            .execute(Method::POST, "/api/vote", None, Some(to_body(vote)?))
            .await?;
        interpret_vote_reply(&response, &vote.matricule)
    }

    pub async fn fetch_stats(&self) -> Result<StatsSnapshot, AppError> {
        let response = self.execute(Method::GET, "/api/stats", None, None).await?;
        if !response.is_success() {
            return Err(AppError::Fetch(failure_message(&response, "Failed to fetch statistics")));
        }
        decode(&response)
    }

    pub async fn fetch_votes(&self, token: &str) -> Result<Vec<Vote>, AppError> {
        let response = self.execute(Method::GET, "/api/votes", Some(token), None).await?;
        if !response.is_success() {
            return Err(AppError::Fetch("Failed to fetch votes".to_string()));
        }
        let records: Vec<Value> = decode(&response)?;
        Ok(votes_from_values(&records))
    }

    pub async fn update_vote(&self, token: &str, id: &str, update: &VoteUpdate) -> Result<(), AppError> {
        let path = format!("/api/votes/{}", id);
        let response = self
            .execute(Method::PUT, &path, Some(token), Some(to_body(update)?))
            .await?;
        if !response.is_success() {
            return Err(AppError::Fetch(failure_message(&response, "Failed to update vote")));
        }
        Ok(())
    }

    pub async fn delete_vote(&self, token: &str, id: &str) -> Result<(), AppError> {
        let path = format!("/api/votes/{}", id);
        let response = self.execute(Method::DELETE, &path, Some(token), None).await?;
        if !response.is_success() {
            return Err(AppError::Fetch(failure_message(&response, "Failed to delete vote")));
        }
        Ok(())
    }

    /// Returns the issued admin token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, AppError> {
        let response = self
            .execute(Method::POST, "/api/admin/login", None, Some(to_body(credentials)?))
            .await?;
        if !response.is_success() {
            return Err(AppError::Auth(failure_message(&response, "Login failed")));
        }
        let reply: LoginReply =
            decode(&response).map_err(|_| AppError::Auth("Login failed".to_string()))?;
        Ok(reply.token)
    }

    /// Public list. A `data` field that is not an array yields an empty list.
    pub async fn fetch_public_votes(&self) -> Result<Vec<Vote>, AppError> {
        let response = self.execute(Method::GET, "/api/public/votes", None, None).await?;
        if !response.is_success() {
            return Err(AppError::Fetch("Failed to fetch votes".to_string()));
        }
        let json = response
            .json()
            .ok_or_else(|| AppError::MalformedResponse("expected JSON from /api/public/votes".to_string()))?;

        let records = match json.get("data") {
            Some(Value::Array(items)) => items,
            other => {
                debug!("Public vote list has no array in `data`: {:?}", other);
                return Ok(Vec::new());
            }
        };

        // Skip individual records the backend got wrong instead of failing the page
        Ok(votes_from_values(records))
    }
}

fn to_body<T: Serialize>(payload: &T) -> Result<Value, AppError> {
    serde_json::to_value(payload).map_err(|e| AppError::MalformedResponse(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(response: &ApiResponse) -> Result<T, AppError> {
    match &response.body {
        Body::Json(value) => serde_json::from_value(value.clone())
            .map_err(|e| AppError::MalformedResponse(e.to_string())),
        Body::Text(_) => Err(AppError::MalformedResponse(format!(
            "expected JSON, got non-JSON body (HTTP {})",
            response.status
        ))),
    }
}

fn failure_message(response: &ApiResponse, fallback: &str) -> String {
    response
        .message()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Map the reply of `POST /api/vote` onto the submission error taxonomy.
fn interpret_vote_reply(response: &ApiResponse, matricule: &str) -> Result<(), AppError> {
    let json = match &response.body {
        Body::Json(json) => json,
        // Error pages from proxies are not JSON; only the status is meaningful
        Body::Text(_) => {
            return Err(match response.status {
                409 => AppError::DuplicateVote { matricule: matricule.to_string() },
                400 => AppError::InvalidMatricule,
                status => AppError::MalformedResponse(format!("non-JSON reply with HTTP {}", status)),
            });
        }
    };

    if response.is_success() {
        return Ok(());
    }

    let message = json.get("message").and_then(|m| m.as_str()).unwrap_or_default();
    Err(match message {
        "User has already voted" => AppError::DuplicateVote { matricule: matricule.to_string() },
        "Invalid matricule format" => AppError::InvalidMatricule,
        "Matricule is required" => AppError::MatriculeRequired,
        "Name is required" => AppError::NameRequired,
        _ => match response.status {
            409 => AppError::DuplicateVote { matricule: matricule.to_string() },
            400 => AppError::InvalidMatricule,
            _ => AppError::Generic,
        },
    })
}
