//! JSON body extractor reporting rejections in the API error body

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{ApiError, ApiErrorType};

/// `axum::Json` whose rejection is an [`ApiError`].
///
/// When the body is valid JSON of the wrong shape, `param` names the
/// offending field, e.g. `steps[1].step_order` or `email.smtp_port`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Json(value))
            .map_err(rejection_error)
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Leading `path: ` of a data error, e.g. `steps[0].timeout_ms: invalid type ...`
static FIELD_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_\[\]]+(?:\.[A-Za-z0-9_\[\]]+)*): ")
        .expect("field path pattern is a valid regex")
});

/// Field named by a missing or unknown field error
static NAMED_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:missing|unknown) field `([^`]+)`").expect("named field pattern is a valid regex")
});

fn rejection_error(rejection: JsonRejection) -> ApiError {
    let status = rejection.status();
    let (message, param) = match &rejection {
        JsonRejection::JsonDataError(err) => {
            let text = err.body_text();
            let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(&text);
            (
                format!("Invalid request body: {}", detail),
                offending_field(detail),
            )
        }
        JsonRejection::JsonSyntaxError(err) => {
            (format!("Invalid JSON syntax: {}", err.body_text()), None)
        }
        JsonRejection::MissingJsonContentType(_) => (
            "Expected request with 'Content-Type: application/json'".to_string(),
            None,
        ),
        other => (other.body_text(), None),
    };

    let error = ApiError::new(status, ApiErrorType::InvalidRequestError, message)
        .with_code("json_parse_error");
    match param {
        Some(param) => error.with_param(param),
        None => error,
    }
}

/// Dotted path of the field a deserialization error points at
fn offending_field(detail: &str) -> Option<String> {
    let (path, rest) = match FIELD_PATH.captures(detail) {
        Some(caps) => {
            let path = caps.get(1).map(|m| m.as_str());
            (path, &detail[caps.get(0).map_or(0, |m| m.end())..])
        }
        None => (None, detail),
    };
    let named = NAMED_FIELD
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    match (path, named) {
        (Some(path), Some(field)) => Some(format!("{}.{}", path, field)),
        (Some(path), None) => Some(path.to_string()),
        (None, Some(field)) => Some(field.to_string()),
        (None, None) => None,
    }
}
