use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::error::RestError;

// error_code values returned by the service
const NOT_FOUND_ERROR: &str = "NOT_FOUND";
const ALREADY_EXISTS_ERROR: &str = "ALREADY_EXISTS";

#[derive(Debug, Default, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a failed response onto the matching [`RestError`].
pub(crate) fn error_from_body(status: u16, body: &str) -> RestError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.message.unwrap_or_else(|| body.to_string());

    match parsed.error_code.map(|code| code.to_uppercase()).as_deref() {
        Some(NOT_FOUND_ERROR) => RestError::DoesNotExist(message),
        Some(ALREADY_EXISTS_ERROR) => RestError::AlreadyExists(message),
        _ => RestError::Server { status, message },
    }
}

/// Returns the response unchanged when it succeeded, the mapped error otherwise.
pub(crate) async fn check(response: Response) -> Result<Response, RestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Unity Catalog responded with {}: {}", status, body);
    Err(error_from_body(status.as_u16(), &body))
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RestError> {
    let response = check(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| RestError::InvalidResponse(format!("{e}: {body}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_error_codes() {
        let err = error_from_body(
            404,
            r#"{"error_code": "NOT_FOUND", "message": "Catalog not found: foo"}"#,
        );
        assert!(matches!(err, RestError::DoesNotExist(ref m) if m == "Catalog not found: foo"));

        let err = error_from_body(409, r#"{"error_code": "already_exists", "message": "dup"}"#);
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_falls_back_to_body_text() {
        let err = error_from_body(500, "gateway exploded");
        match err {
            RestError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "gateway exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
