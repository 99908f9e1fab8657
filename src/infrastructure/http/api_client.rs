use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const FALLBACK_ERROR: &str = "An error occurred";

/// JSON client for the dashboard REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    auth_token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let base_url = normalize_base_url(&config.base_url);
        if base_url.is_empty() {
            return Err(AppError::ConfigurationError(
                "API base URL is empty".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| AppError::ConfigurationError(format!("HTTP client: {err}")))?;

        Ok(Self {
            base_url,
            auth_token: config
                .auth_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let resp = self.request(Method::GET, path).query(query).send().await?;
        parse_json(resp).await
    }

    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let resp = self.request(method, path).json(body).send().await?;
        parse_json(resp).await
    }

    /// Send a request whose response body is not needed.
    pub async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(), AppError> {
        let mut builder = self.request(method, path).query(query);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        ensure_success(resp).await.map(|_| ())
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%method, %url, "api request");
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Strip trailing slashes and a legacy trailing `/auth` segment.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/auth")
        .unwrap_or(trimmed)
        .to_string()
}

async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, AppError> {
    let body = ensure_success(resp).await?;
    serde_json::from_str(&body)
        .map_err(|err| AppError::DeserializationError(format!("unexpected response body: {err}")))
}

async fn ensure_success(resp: reqwest::Response) -> Result<String, AppError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if status.is_success() {
        return Ok(body);
    }
    Err(error_from_response(status, &body))
}

pub fn error_from_response(status: StatusCode, body: &str) -> AppError {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(value) => error_message(&value),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => FALLBACK_ERROR.to_string(),
    };

    match status {
        StatusCode::UNAUTHORIZED => {
            warn!("api rejected credentials");
            AppError::Unauthorized(message)
        }
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => {
            if status.is_server_error() {
                warn!(status = status.as_u16(), %message, "api server error");
            }
            AppError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Pull a human readable message out of an error body: `detail` (string,
/// validation list or `{msg}`), then `message`, then `error`.
pub fn error_message(data: &Value) -> String {
    if let Some(text) = data.as_str() {
        return text.to_string();
    }

    if let Some(detail) = data.get("detail") {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        if let Some(validation) = format_validation_errors(detail) {
            return validation;
        }
        if let Some(msg) = detail.get("msg").and_then(Value::as_str) {
            return msg.to_string();
        }
    }

    ["message", "error"]
        .iter()
        .find_map(|field| data.get(*field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_ERROR.to_string())
}

fn format_validation_errors(detail: &Value) -> Option<String> {
    let entries = detail.as_array()?;
    let lines: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            if let Some(text) = entry.as_str() {
                return Some(text.to_string());
            }
            let obj = entry.as_object()?;
            let field = obj
                .get("loc")
                .and_then(Value::as_array)
                .map(|loc| {
                    loc.iter()
                        .skip(1)
                        .map(|part| match part {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .unwrap_or_default();
            let msg = obj
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("Invalid input");
            Some(if field.is_empty() {
                msg.to_string()
            } else {
                format!("{field}: {msg}")
            })
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(", "))
    }
}
