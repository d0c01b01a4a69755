use crate::config::{ClientConfig, DEFAULT_RETRY_AFTER};
use crate::error::{ApiError, Result};
use crate::rate_limiter::RateLimiter;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Shared HTTP plumbing for the backend clients: default headers, pacing and
/// response/error decoding.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    config: ClientConfig,
    limiter: RateLimiter,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let limiter = RateLimiter::new(config.cooldown);
        Self::new_with_limiter(config, limiter)
    }

    pub fn new_with_limiter(config: ClientConfig, limiter: RateLimiter) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.http.get(self.url_for(path)).query(query);
        let response = self.dispatch(Method::GET, request).await?;
        self.parse_json(response).await
    }

    /// Fetches a fully qualified URL, e.g. a pagination link handed out by the API.
    pub async fn get_absolute<T>(&self, href: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.absolute_url(href)?;
        let request = self.http.get(url);
        let response = self.dispatch(Method::GET, request).await?;
        self.parse_json(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_body(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_with_body(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.http.request(Method::DELETE, self.url_for(path));
        let response = self.dispatch(Method::DELETE, request).await?;
        self.ensure_success(response).await
    }

    pub async fn send_with_body<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.request(method.clone(), self.url_for(path));
        if let Some(payload) = body {
            request = request.json(payload);
        }
        let response = self.dispatch(method, request).await?;
        self.parse_json(response).await
    }

    async fn dispatch(&self, method: Method, request: RequestBuilder) -> Result<Response> {
        self.limiter.hit().await;
        let request = request.build()?;
        tracing::debug!(%method, url = %request.url(), "sending backend request");
        match self.http.execute(request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                tracing::warn!(%method, error = %err, "backend request failed");
                Err(ApiError::from(err))
            }
        }
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    fn absolute_url(&self, href: &str) -> Result<Url> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Url::parse(href).map_err(|err| ApiError::Other(err.to_string()));
        }

        Url::parse(&self.config.api_root())
            .and_then(|url| url.join(href.trim_start_matches('/')))
            .map_err(|err| ApiError::Other(err.to_string()))
    }

    async fn parse_json<T>(&self, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(ApiError::from)
        } else {
            Err(self.failure(status, response).await)
        }
    }

    async fn ensure_success(&self, response: Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.failure(status, response).await)
        }
    }

    async fn failure(&self, status: StatusCode, response: Response) -> ApiError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let delay = retry_after(response.headers()).unwrap_or(DEFAULT_RETRY_AFTER);
            tracing::warn!(delay_ms = delay.as_millis() as u64, "backend throttled the request");
            self.limiter.back_off(delay).await;
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, "backend responded with an error");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ApiError::Authentication(format!("Access denied ({}) - {}", status, body))
        } else {
            build_http_error(status, &body)
        }
    }
}

fn build_http_client(config: &ClientConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    let mut auth_value = header_value(config.credentials.header_value())?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| ApiError::Other(err.to_string()))
}

/// Seconds form of `Retry-After`; HTTP dates are not used by these APIs.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| ApiError::Other(err.to_string()))
}

fn build_http_error(status: StatusCode, body: &str) -> ApiError {
    let code = extract_error_code(body);
    ApiError::http(status, code, body.to_string())
}

/// Pulls an API error code out of a JSON error body. Tempo reports
/// `{"errors":[{"code":..}]}`, other APIs a top-level `code`.
fn extract_error_code(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    let code = value.get("code").or_else(|| {
        value
            .get("errors")
            .and_then(|errors| errors.get(0))
            .and_then(|first| first.get("code"))
    })?;
    match code {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
