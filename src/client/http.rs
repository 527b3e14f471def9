use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::token::TokenStore;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(_) => None,
        }
    }
}

/// Thin wrapper over `reqwest` that attaches the bearer credential when one
/// is set and turns non-2xx responses into `RequestError::Status` carrying
/// the server's message. No retries, no backoff: failures surface to the
/// caller immediately.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let req = self.http.get(self.url(path));
        let res = self.send(req).await?;
        Ok(res.json().await?)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RequestError> {
        let req = self.http.post(self.url(path)).json(body);
        let res = self.send(req).await?;
        Ok(res.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RequestError> {
        let req = match self.tokens.get() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let res = req.send().await?;
        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or(body);

        Err(RequestError::Status { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:3000/", TokenStore::new());
        assert_eq!(client.url("/profile"), "http://localhost:3000/profile");

        let client = ApiClient::new("http://localhost:3000", TokenStore::new());
        assert_eq!(client.url("/profile"), "http://localhost:3000/profile");
    }

    #[test]
    fn test_status_accessor() {
        let err = RequestError::Status {
            status: 409,
            message: "slot taken".to_string(),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "server returned 409: slot taken");
    }
}
