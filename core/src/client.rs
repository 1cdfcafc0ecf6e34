//! Request building and response checks shared by every API handle.
//!
//! # Design
//! `ApiClient` holds the config and the API's path prefix and carries no
//! mutable state between calls. It builds authenticated `HttpRequest`
//! values; the free functions below inspect `HttpResponse` values. Neither
//! touches the network.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ApiError, ErrorDetail};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Base for the per-API handles: knows where the API lives and how to
/// authenticate against it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Config,
    path: String,
}

impl ApiClient {
    pub fn new(config: Config, path: &str) -> Self {
        let config = Config {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };
        Self {
            config,
            path: path.to_string(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Absolute url for `suffix` under this API's path.
    pub fn url_for(&self, suffix: &str) -> String {
        format!("{}{}{}", self.config.base_url, self.path, suffix)
    }

    pub fn build_get(&self, url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: self.auth_headers(),
            body: None,
        }
    }

    pub fn build_delete(&self, url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: url.to_string(),
            headers: self.auth_headers(),
            body: None,
        }
    }

    pub fn build_post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut headers = vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())];
        headers.extend(self.auth_headers());
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers,
            body: Some(body),
        })
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![("authorization".to_string(), self.config.api_key.clone())]
    }
}

/// Reject responses whose `Content-Type` is not JSON.
///
/// Parameters such as `; charset=utf-8` are allowed. A missing header counts
/// as an empty content type.
pub fn assert_json(response: &HttpResponse) -> Result<(), ApiError> {
    let content_type = response.header("content-type").unwrap_or("");
    let is_json = content_type
        .get(..JSON_CONTENT_TYPE.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(JSON_CONTENT_TYPE));
    if is_json {
        return Ok(());
    }
    Err(ApiError::NotJson {
        content_type: content_type.to_string(),
        status: response.status,
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

/// Check content type and status before the body is decoded.
///
/// `noun` and `verb` name the operation in the error message, as in
/// "template does not exist, create failed".
pub fn check_response(noun: &str, verb: &str, response: &HttpResponse) -> Result<(), ApiError> {
    assert_json(response)?;
    if response.is_success() {
        return Ok(());
    }

    let (noun, verb) = (noun.to_string(), verb.to_string());
    match response.status {
        401 => Err(ApiError::Unauthorized { noun, verb }),
        403 => Err(ApiError::Forbidden { noun, verb }),
        404 => Err(ApiError::NotFound { noun, verb }),
        status => {
            let errors = match serde_json::from_str::<ErrorBody>(&response.body) {
                Ok(body) => body.errors,
                Err(e) => {
                    tracing::debug!(status, error = %e, "error body has no readable errors array");
                    Vec::new()
                }
            };
            Err(ApiError::Api { status, errors })
        }
    }
}

/// Deserialize a JSON body into `T`.
pub fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
