use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::{ApiRequest, ApiResponse, Auth, AuthScheme, Body, Transport};
use crate::error::AppError;

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn inject_auth(builder: reqwest::RequestBuilder, auth: &Auth) -> reqwest::RequestBuilder {
        match auth.scheme {
            AuthScheme::Bearer => builder.bearer_auth(&auth.token),
            AuthScheme::AdminTokenHeader => builder.header("x-admin-token", &auth.token),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AppError> {
        let url = self.url_for(&request.path);
        let mut builder = self.client.request(request.method, &url);

        if let Some(auth) = &request.auth {
            builder = Self::inject_auth(builder, auth);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to send request to {}: {}", request.path, e)))?;

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read response from {}: {}", request.path, e)))?;

        let body = if is_json {
            match serde_json::from_str(&text) {
                Ok(value) => Body::Json(value),
                Err(e) => {
                    log::warn!("Response from {} claims JSON but does not parse: {}", request.path, e);
                    Body::Text(text)
                }
            }
        } else {
            Body::Text(text)
        };

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_url_and_path() {
        let transport = HttpTransport::new("https://example.org/");
        assert_eq!(transport.url_for("/api/stats"), "https://example.org/api/stats");
        assert_eq!(transport.url_for("api/vote"), "https://example.org/api/vote");
    }
}
