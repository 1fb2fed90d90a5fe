//! Validation Utilities
//!
//! Flattens both local `validator` failures and the server's structured
//! error bodies into one display string.

use serde::Deserialize;
use validator::ValidationErrors;

use super::error::ApiError;

/// Separator between flattened field messages.
const JOIN_SEPARATOR: &str = "; ";

/// Convert local validation errors to ApiError
pub fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".into());
                format!("{}: {}", field, message)
            })
        })
        .collect();

    // field_errors() is backed by a HashMap
    messages.sort();

    if messages.is_empty() {
        return ApiError::Validation("Validation failed".into());
    }

    ApiError::Validation(messages.join(JOIN_SEPARATOR))
}

/// Error body returned by the API.
///
/// `detail` is either a plain string or a list of per-field entries (422).
#[derive(Debug, Deserialize)]
pub struct ServerErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldDetail>),
}

/// One entry of a structured validation error.
#[derive(Debug, Deserialize)]
pub struct FieldDetail {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
}

impl FieldDetail {
    /// Last path segment of `loc`, skipping the `body`/`query` prefix.
    fn field(&self) -> Option<String> {
        self.loc
            .iter()
            .rev()
            .find_map(|segment| match segment {
                serde_json::Value::String(s) if s != "body" && s != "query" => Some(s.clone()),
                _ => None,
            })
    }
}

/// What a non-2xx body turned out to contain.
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedError {
    /// Flattened multi-field message
    Validation(String),
    /// Single server-provided message
    Message(String),
    /// Nothing usable; caller falls back to its default
    Unknown,
}

/// Parse a raw error body into a single message.
pub fn parse_error_body(body: &str) -> ParsedError {
    let Ok(parsed) = serde_json::from_str::<ServerErrorBody>(body) else {
        return ParsedError::Unknown;
    };

    match parsed.detail {
        Some(ErrorDetail::Fields(fields)) if !fields.is_empty() => {
            ParsedError::Validation(flatten_fields(&fields))
        }
        Some(ErrorDetail::Message(msg)) if !msg.trim().is_empty() => ParsedError::Message(msg),
        _ => match parsed.message {
            Some(msg) if !msg.trim().is_empty() => ParsedError::Message(msg),
            _ => ParsedError::Unknown,
        },
    }
}

/// Join structured field errors into one string, preserving server order.
pub fn flatten_fields(fields: &[FieldDetail]) -> String {
    fields
        .iter()
        .map(|f| match f.field() {
            Some(field) => format!("{}: {}", field, f.msg),
            None => f.msg.clone(),
        })
        .collect::<Vec<_>>()
        .join(JOIN_SEPARATOR)
}
