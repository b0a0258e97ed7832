//! HTTP client for the tax-record API.
//!
//! Endpoints:
//! - `GET    {base}/tax`       -> `{ "success": bool, "data": [TaxRecord] }`
//! - `POST   {base}/tax`       -> create a record from a [`NewRecord`] body
//! - `DELETE {base}/tax/{id}`  -> remove one record
//!
//! Failures are kept as a typed [`ApiError`] rather than flattened into
//! strings, so callers can choose the right user-facing wording per
//! operation. A non-2xx status with a JSON `message` in the body keeps
//! that message; everything else records the status alone.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::types::{NewRecord, TaxRecord};
use crate::error::AppError;

/// Default request timeout, overridable with `--timeout-secs`.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Why a request against the tax API failed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, refused
    /// connection, timeout).
    #[error("{endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered but refused the request, either with a non-2xx
    /// status or with a `success: false` envelope.
    #[error("{endpoint} rejected{}{}", status_suffix(.status), message_suffix(.message))]
    Rejected {
        endpoint: String,
        status: Option<u16>,
        message: Option<String>,
    },
    /// A 2xx response whose body did not match the documented shape.
    #[error("{endpoint} returned an unreadable body: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Message the server attached to a rejection, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of a rejection, if the server got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(text) => format!(": {text}"),
        None => String::new(),
    }
}

/// Blocking client for the tax-record service.
pub struct TaxApiClient {
    http: Client,
    base_url: String,
}

impl TaxApiClient {
    /// Build a client against an explicit base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AppError::config("API base URL must not be empty."));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, base_url })
    }

    /// Build a client from `TAX_API_URL` in the environment (or `.env`).
    pub fn from_env(timeout: Duration) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("TAX_API_URL").map_err(|_| {
            AppError::config("Missing TAX_API_URL in environment (.env), and no --api-url given.")
        })?;
        Self::new(base_url, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every stored tax record.
    pub fn list(&self) -> Result<Vec<TaxRecord>, ApiError> {
        let endpoint = "GET /tax";
        let url = format!("{}/tax", self.base_url);
        log::debug!("{endpoint} -> {url}");

        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| transport(endpoint, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejected(endpoint, status.as_u16(), resp));
        }

        let body: ListEnvelope = resp.json().map_err(|e| decode(endpoint, e))?;
        if !body.success {
            return Err(ApiError::Rejected {
                endpoint: endpoint.to_string(),
                status: Some(status.as_u16()),
                message: body.message,
            });
        }
        log::debug!("{endpoint} returned {} records", body.data.len());
        Ok(body.data)
    }

    /// Submit a new record.
    pub fn create(&self, record: &NewRecord) -> Result<(), ApiError> {
        let endpoint = "POST /tax";
        let url = format!("{}/tax", self.base_url);
        log::debug!("{endpoint} -> {url}");

        let resp = self
            .http
            .post(&url)
            .json(record)
            .send()
            .map_err(|e| transport(endpoint, e))?;

        self.check_ack(endpoint, resp)
    }

    /// Delete a record by id.
    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        let endpoint = "DELETE /tax/{id}";
        let url = format!("{}/tax/{}", self.base_url, id);
        log::debug!("{endpoint} -> {url}");

        let resp = self
            .http
            .delete(&url)
            .send()
            .map_err(|e| transport(endpoint, e))?;

        self.check_ack(endpoint, resp)
    }

    /// Accept any 2xx write response, unless its body explicitly says
    /// `success: false`.
    fn check_ack(
        &self,
        endpoint: &str,
        resp: reqwest::blocking::Response,
    ) -> Result<(), ApiError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(rejected(endpoint, status.as_u16(), resp));
        }
        let body = resp.text().unwrap_or_default();
        if let Ok(ack) = serde_json::from_str::<AckEnvelope>(&body) {
            if !ack.success {
                return Err(ApiError::Rejected {
                    endpoint: endpoint.to_string(),
                    status: Some(status.as_u16()),
                    message: ack.message,
                });
            }
        }
        Ok(())
    }
}

fn transport(endpoint: &str, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}

fn decode(endpoint: &str, source: reqwest::Error) -> ApiError {
    ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// Build a rejection from a non-2xx response, salvaging the body's
/// `message` field when the body is JSON.
fn rejected(endpoint: &str, status: u16, resp: reqwest::blocking::Response) -> ApiError {
    let body = resp.text().unwrap_or_default();
    let message = serde_json::from_str::<AckEnvelope>(&body)
        .ok()
        .and_then(|ack| ack.message);
    ApiError::Rejected {
        endpoint: endpoint.to_string(),
        status: Some(status),
        message,
    }
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    success: bool,
    #[serde(default)]
    data: Vec<TaxRecord>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let client =
            TaxApiClient::new("http://localhost:5000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(TaxApiClient::new("", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn rejected_display_includes_status_and_message() {
        let err = ApiError::Rejected {
            endpoint: "POST /tax".to_string(),
            status: Some(400),
            message: Some("Tax rate must be positive".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("400"));
        assert!(text.contains("Tax rate must be positive"));
    }

    #[test]
    fn ack_without_success_field_defaults_to_ok() {
        let ack: AckEnvelope = serde_json::from_str("{\"data\": {}}").unwrap();
        assert!(ack.success);
    }
}
