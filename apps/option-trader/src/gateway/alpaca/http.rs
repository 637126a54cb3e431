//! HTTP transport for the Alpaca API with bounded retry.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::ApiErrorBody;
use super::config::{AlpacaConfig, RetryConfig};
use super::error::AlpacaError;

/// Authenticated HTTP client for the trading and data APIs.
#[derive(Debug, Clone)]
pub struct AlpacaHttpClient {
    client: Client,
    api_key: String,
    api_secret: String,
    trading_base_url: String,
    data_base_url: String,
    retry: RetryConfig,
}

impl AlpacaHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(AlpacaError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlpacaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            trading_base_url: config.environment.trading_base_url().to_string(),
            data_base_url: config.environment.data_base_url().to_string(),
            retry: config.retry.clone(),
        })
    }

    /// GET from the trading API.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlpacaError> {
        self.request(Method::GET, &self.trading_base_url, path, None::<&()>)
            .await
    }

    /// GET from the market data API.
    pub async fn data_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlpacaError> {
        self.request(Method::GET, &self.data_base_url, path, None::<&()>)
            .await
    }

    /// POST to the trading API.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AlpacaError> {
        self.request(Method::POST, &self.trading_base_url, path, Some(body))
            .await
    }

    /// PATCH to the trading API (in-place order replace).
    pub async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AlpacaError> {
        self.request(Method::PATCH, &self.trading_base_url, path, Some(body))
            .await
    }

    /// DELETE on the trading API. A 204 response body is empty.
    pub async fn delete(&self, path: &str) -> Result<(), AlpacaError> {
        let _: serde_json::Value = self
            .request(Method::DELETE, &self.trading_base_url, path, None::<&()>)
            .await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, AlpacaError> {
        let url = format!("{base_url}{path}");
        let mut backoff = ExponentialBackoff::new(&self.retry);

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("APCA-API-KEY-ID", &self.api_key)
                .header("APCA-API-SECRET-KEY", &self.api_secret);
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AlpacaError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| AlpacaError::Network(e.to_string()))?;
                if text.is_empty() {
                    return serde_json::from_str("null")
                        .map_err(|e| AlpacaError::JsonParse(e.to_string()));
                }
                return serde_json::from_str(&text)
                    .map_err(|e| AlpacaError::JsonParse(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();
            let (error_code, error_message) = match serde_json::from_str::<ApiErrorBody>(&error_body)
            {
                Ok(err) => (
                    err.code.unwrap_or_else(|| status.as_u16().to_string()),
                    err.message,
                ),
                Err(_) => (status.as_u16().to_string(), error_body),
            };

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    let delay = retry_after
                        .map(Duration::from_secs)
                        .or_else(|| backoff.next_backoff());
                    if let Some(delay) = delay {
                        tracing::warn!(
                            code = %error_code,
                            delay_ms = delay.as_millis(),
                            "Rate limited, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AlpacaError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            code = %error_code,
                            message = %error_message,
                            delay_ms = delay.as_millis(),
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(AlpacaError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
                ErrorCategory::NonRetryable => {
                    return match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            Err(AlpacaError::AuthenticationFailed)
                        }
                        StatusCode::NOT_FOUND => Err(AlpacaError::OrderNotFound {
                            order_id: path.to_string(),
                        }),
                        StatusCode::UNPROCESSABLE_ENTITY => {
                            Err(AlpacaError::OrderRejected(error_message))
                        }
                        _ => Err(AlpacaError::Api {
                            code: error_code,
                            message: error_message,
                        }),
                    };
                }
            }
        }
    }
}

/// Retry disposition for a response status.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// 429 honors Retry-After; timeouts and 5xx gateway failures back off
/// and retry; everything else surfaces immediately.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Multiplicative backoff with a ceiling and a fixed attempt budget.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(429; "too many requests")]
    fn status_rate_limits(code: u16) {
        let status = StatusCode::from_u16(code).unwrap();
        assert!(matches!(
            categorize_status(status),
            ErrorCategory::RateLimited
        ));
    }

    #[test_case(408; "request timeout")]
    #[test_case(500; "internal server error")]
    #[test_case(502; "bad gateway")]
    #[test_case(503; "service unavailable")]
    #[test_case(504; "gateway timeout")]
    fn status_retries(code: u16) {
        let status = StatusCode::from_u16(code).unwrap();
        assert!(matches!(categorize_status(status), ErrorCategory::Retryable));
    }

    #[test_case(400; "bad request")]
    #[test_case(401; "unauthorized")]
    #[test_case(404; "not found")]
    #[test_case(422; "unprocessable entity")]
    fn status_surfaces_immediately(code: u16) {
        let status = StatusCode::from_u16(code).unwrap();
        assert!(matches!(
            categorize_status(status),
            ErrorCategory::NonRetryable
        ));
    }

    #[test]
    fn backoff_grows_and_stops() {
        let config = RetryConfig {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        };

        let mut backoff = ExponentialBackoff::new(&config);
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(400)));
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn backoff_respects_ceiling() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(3),
            multiplier: 10.0,
        };

        let mut backoff = ExponentialBackoff::new(&config);
        backoff.next_backoff();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn client_rejects_empty_credentials() {
        let config = AlpacaConfig::new(
            String::new(),
            String::new(),
            super::super::config::AlpacaEnvironment::Paper,
        );
        assert!(matches!(
            AlpacaHttpClient::new(&config),
            Err(AlpacaError::AuthenticationFailed)
        ));
    }
}
