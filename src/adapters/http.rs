use crate::adapters::retry::{retry_with_backoff, RetryPolicy};
use crate::utils::error::{BallotError, NetworkError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// 帶有重試與統一錯誤解碼的 HTTP 客戶端，不理解選票語意
#[derive(Debug, Clone)]
pub struct NetworkClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl NetworkClient {
    pub fn new(base_url: &str, retry: RetryPolicy) -> Result<Self> {
        // Url::join 需要結尾斜線，否則最後一段路徑會被取代
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| BallotError::InvalidConfigValueError {
                field: "backend.base_url".to_string(),
                value: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client: Client::new(),
            base_url,
            retry,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn endpoint(&self, path: &str) -> std::result::Result<Url, NetworkError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| NetworkError::Transport {
                message: format!("Invalid endpoint '{}': {}", path, e),
            })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> std::result::Result<T, NetworkError> {
        let url = self.endpoint(path)?;
        self.request_with_retry(&self.retry, || self.client.get(url.clone()))
            .await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> std::result::Result<T, NetworkError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let payload = serde_json::to_vec(body).map_err(|e| NetworkError::Decode {
            message: format!("Could not encode request body: {}", e),
        })?;
        self.request_with_retry(&self.retry, || {
            self.client.post(url.clone()).body(payload.clone())
        })
        .await
    }

    /// 單次嘗試的連線檢查
    pub async fn ping(&self, path: &str) -> bool {
        let url = match self.endpoint(path) {
            Ok(url) => url,
            Err(_) => return false,
        };
        self.request_with_retry::<serde_json::Value, _>(&RetryPolicy::single_attempt(), || {
            self.client.get(url.clone())
        })
        .await
        .is_ok()
    }

    pub async fn request_with_retry<T, F>(
        &self,
        policy: &RetryPolicy,
        build: F,
    ) -> std::result::Result<T, NetworkError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        retry_with_backoff(policy, |attempt| {
            let mut request = build().header(CONTENT_TYPE, "application/json");
            if let Some(timeout) = self.timeout {
                request = request.timeout(timeout);
            }
            async move {
                tracing::debug!("📡 Sending request (attempt {})", attempt + 1);
                execute(request).await
            }
        })
        .await
    }
}

async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> std::result::Result<T, NetworkError> {
    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(decode_error(status.as_u16(), &body));
    }

    response.json::<T>().await.map_err(|e| NetworkError::Decode {
        message: e.to_string(),
    })
}

/// 非 2xx 回應：JSON 的 `error` 欄位成為訊息，`code` 或 `type` 成為錯誤碼
pub fn decode_error(status: u16, body: &str) -> NetworkError {
    let details = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .filter(|v| v.is_object());

    let field = |name: &str| {
        details
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let message = field("error").unwrap_or_else(|| format!("HTTP status {}", status));
    let code = field("code").or_else(|| field("type"));

    NetworkError::Http {
        status,
        code,
        message,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_uses_error_field() {
        let err = decode_error(400, r#"{"error": "Este DNI ya ha votado", "code": "DUPLICATE_VOTE"}"#);
        assert_eq!(err.to_string(), "Este DNI ya ha votado");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.code(), Some("DUPLICATE_VOTE"));
        assert!(err.details().is_some());
    }

    #[test]
    fn test_decode_error_falls_back_to_status() {
        let err = decode_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "HTTP status 502");
        assert_eq!(err.code(), None);
        assert!(err.details().is_none());

        let err = decode_error(500, r#"{"detail": "boom"}"#);
        assert_eq!(err.to_string(), "HTTP status 500");
    }

    #[test]
    fn test_legacy_type_field_becomes_code() {
        let err = decode_error(400, r#"{"error": "DNI ya votó", "type": "DNI_YA_VOTO"}"#);
        assert_eq!(err.code(), Some("DNI_YA_VOTO"));
    }

    #[test]
    fn test_endpoint_join_keeps_base_path() {
        let client = NetworkClient::new("http://localhost:5000/api", RetryPolicy::default()).unwrap();
        assert_eq!(
            client.endpoint("/votes").unwrap().as_str(),
            "http://localhost:5000/api/votes"
        );
        assert_eq!(
            client.endpoint("voters/verify/12345678").unwrap().as_str(),
            "http://localhost:5000/api/voters/verify/12345678"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = NetworkClient::new("not a url", RetryPolicy::default()).unwrap_err();
        assert!(matches!(err, BallotError::InvalidConfigValueError { .. }));
    }
}
