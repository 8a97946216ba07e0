// Error types shared by the HTTP adapter, the resource operations and the forms

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// Keys in a DRF error body that carry a message rather than a field error
const MESSAGE_KEYS: [&str; 3] = ["detail", "error", "non_field_errors"];

// Field name -> messages, ordered so the "first" error is stable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.0
            .iter()
            .find_map(|(field, messages)| messages.first().map(|m| (field.as_str(), m.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    // Parses `{"field": ["msg", ...], "other": "msg"}`, skipping message keys
    pub fn from_body(body: &Value) -> Self {
        let mut errors = Self::new();
        let Some(map) = body.as_object() else {
            return errors;
        };

        for (field, value) in map {
            if MESSAGE_KEYS.contains(&field.as_str()) {
                continue;
            }
            for message in flatten_messages(value) {
                errors.push(field.clone(), message);
            }
        }
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

// Which part of the UI an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    // Caught locally, no request was sent
    Validation,
    // Reported by the server against specific inputs
    Field,
    // Network, timeout, auth or server failure shown as a banner
    Request,
}

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError {
        status_code: u16,
        message: String,
        field_errors: FieldErrors,
    },

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl ApiError {
    // Builds the error for a non-2xx response from its raw body
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let message = parsed
            .as_ref()
            .and_then(message_from_body)
            .unwrap_or_else(|| format!("Request failed with status {}", status_code));

        if status_code == 401 {
            return ApiError::Unauthorized(message);
        }

        let field_errors = parsed.as_ref().map(field_errors_from_body).unwrap_or_default();
        ApiError::ApiResponseError {
            status_code,
            message,
            field_errors,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Validation(_) => ErrorCategory::Validation,
            ApiError::ApiResponseError { field_errors, .. } if !field_errors.is_empty() => {
                ErrorCategory::Field
            }
            _ => ErrorCategory::Request,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkError(_) | ApiError::Timeout(_) => true,
            ApiError::ApiResponseError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::ApiResponseError { status_code, .. } => Some(*status_code),
            ApiError::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::ApiResponseError { field_errors, .. } => Some(field_errors),
            ApiError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    // Text suitable for a form or page banner
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ApiResponseError { message, .. } => message.clone(),
            ApiError::Unauthorized(message) => message.clone(),
            ApiError::Validation(errors) => errors
                .first()
                .map(|(_, m)| m.to_string())
                .unwrap_or_else(|| "Please correct the highlighted fields.".to_string()),
            ApiError::NetworkError(_) | ApiError::Timeout(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Token storage error: {0}")]
    TokenStorage(String),
}

// `detail` -> `error` -> `non_field_errors` -> first field error
pub fn message_from_body(body: &Value) -> Option<String> {
    if let Some(text) = body.as_str() {
        return Some(text.to_string());
    }

    let map = body.as_object()?;
    for key in MESSAGE_KEYS {
        if let Some(value) = map.get(key) {
            if value.is_object() {
                if let Some((field, message)) = FieldErrors::from_body(value).first() {
                    return Some(format!("{}: {}", field, message));
                }
            }
            if let Some(message) = flatten_messages(value).into_iter().next() {
                return Some(message);
            }
        }
    }

    FieldErrors::from_body(body)
        .first()
        .map(|(field, message)| format!("{}: {}", field, message))
}

// Field errors may sit at the top level or inside `detail` (review endpoint)
fn field_errors_from_body(body: &Value) -> FieldErrors {
    let top = FieldErrors::from_body(body);
    if !top.is_empty() {
        return top;
    }
    body.get("detail")
        .filter(|detail| detail.is_object())
        .map(FieldErrors::from_body)
        .unwrap_or_default()
}

fn flatten_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_messages).collect(),
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        _ => Vec::new(),
    }
}
