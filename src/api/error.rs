use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single field-level complaint from the server or from local validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every way an API call can fail, normalized into one shape.
///
/// `status_code` is `None` when no HTTP response was received (transport
/// failure) or the request was rejected before it was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiFailure {
    pub status_code: Option<u16>,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}

impl ApiFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn transport(error: impl std::fmt::Display) -> Self {
        Self::new(format!("request failed: {error}"))
    }

    pub fn decode(error: impl std::fmt::Display) -> Self {
        Self::new(format!("invalid response body: {error}"))
    }

    /// Classify a non-success response.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let fallback = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        let (message, field_errors) = match parse_error_body(body) {
            Some((message, field_errors)) => (message.unwrap_or(fallback), field_errors),
            None => (fallback, Vec::new()),
        };

        Self {
            status_code: Some(status.as_u16()),
            message,
            field_errors,
        }
    }

    pub fn validation(errors: &validator::ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |err| FieldError {
                    field: field.clone(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value ({})", err.code)),
                })
            })
            .collect();
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        Self {
            status_code: None,
            message: "validation failed".to_string(),
            field_errors,
        }
    }

    pub fn is_status(&self, status: StatusCode) -> bool {
        self.status_code == Some(status.as_u16())
    }
}

/// Returns the top-level message (if any) and field errors found in an error
/// body, or `None` if the body carries nothing usable.
fn parse_error_body(body: &[u8]) -> Option<(Option<String>, Vec<FieldError>)> {
    let value: Value = serde_json::from_slice(body).ok()?;
    // Some endpoints hand back the payload double-encoded as a JSON string.
    let value = match value {
        Value::String(inner) => match serde_json::from_str::<Value>(&inner) {
            Ok(parsed @ Value::Object(_)) => parsed,
            _ => Value::String(inner),
        },
        other => other,
    };

    match value {
        Value::String(text) => non_empty(text).map(|text| (Some(text), Vec::new())),
        Value::Object(map) => {
            let message = ["message", "detail"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .find_map(|text| non_empty(text.to_string()));

            let field_errors: Vec<FieldError> = match map.get("errors") {
                Some(Value::Array(items)) => items.iter().filter_map(structured_error).collect(),
                Some(Value::Object(fields)) => fields
                    .iter()
                    .flat_map(|(field, messages)| field_messages(field, messages))
                    .collect(),
                Some(_) => Vec::new(),
                // A bare DRF field map: every key is a field.
                None if message.is_none() => map
                    .iter()
                    .flat_map(|(field, messages)| field_messages(field, messages))
                    .collect(),
                None => Vec::new(),
            };

            if message.is_none() && field_errors.is_empty() {
                None
            } else {
                Some((message, field_errors))
            }
        }
        _ => None,
    }
}

/// One `{field, message}` entry of Toolhub's `errors` list.
fn structured_error(item: &Value) -> Option<FieldError> {
    Some(FieldError {
        field: item.get("field")?.as_str()?.to_string(),
        message: item.get("message")?.as_str()?.to_string(),
    })
}

fn field_messages(field: &str, messages: &Value) -> Vec<FieldError> {
    let to_error = |message: &str| FieldError {
        field: field.to_string(),
        message: message.to_string(),
    };
    match messages {
        Value::String(message) => vec![to_error(message)],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(to_error)
            .collect(),
        _ => Vec::new(),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
