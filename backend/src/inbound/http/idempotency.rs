//! Helpers for parsing idempotency headers in HTTP handlers.

use actix_web::http::header::HeaderMap;
use serde_json::json;

use crate::domain::{Error, IdempotencyKey, IdempotencyKeyValidationError};

/// HTTP header name for idempotency keys.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Response header flagging that a stored result was returned unchanged.
pub const IDEMPOTENT_REPLAYED_HEADER: &str = "Idempotent-Replayed";

fn header_error(code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": IDEMPOTENCY_KEY_HEADER,
        "code": code,
    }))
}

/// Extract the idempotency key from request headers, if one was sent.
pub fn extract_idempotency_key(
    headers: &HeaderMap,
) -> Result<Option<IdempotencyKey>, IdempotencyKeyValidationError> {
    let Some(header_value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };

    let key_str = header_value
        .to_str()
        .map_err(|_| IdempotencyKeyValidationError::InvalidCharacters)?;

    IdempotencyKey::new(key_str).map(Some)
}

/// Extract a mandatory idempotency key or fail with `400`.
pub fn require_idempotency_key(headers: &HeaderMap) -> Result<IdempotencyKey, Error> {
    extract_idempotency_key(headers)
        .map_err(map_idempotency_key_error)?
        .ok_or_else(|| {
            header_error(
                "missing_header",
                format!("{IDEMPOTENCY_KEY_HEADER} header is required"),
            )
        })
}

/// Map idempotency key validation errors to domain errors.
pub fn map_idempotency_key_error(err: IdempotencyKeyValidationError) -> Error {
    let code = match err {
        IdempotencyKeyValidationError::EmptyKey => "empty_key",
        IdempotencyKeyValidationError::TooLong { .. } => "too_long",
        IdempotencyKeyValidationError::InvalidCharacters => "invalid_characters",
    };
    header_error(code, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};
    use rstest::rstest;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("idempotency-key"),
            HeaderValue::from_str(value).expect("header value"),
        );
        headers
    }

    #[rstest]
    fn missing_header_is_rejected_when_required() {
        let err = require_idempotency_key(&HeaderMap::new()).expect_err("required");
        assert_eq!(err.details().expect("details")["code"], "missing_header");
    }

    #[rstest]
    #[case("", "empty_key")]
    #[case("has space", "invalid_characters")]
    fn malformed_keys_are_rejected(#[case] raw: &str, #[case] code: &str) {
        let err = require_idempotency_key(&headers_with(raw)).expect_err("invalid");
        assert_eq!(err.details().expect("details")["code"], code);
    }

    #[rstest]
    fn over_long_key_is_rejected() {
        let err = require_idempotency_key(&headers_with(&"k".repeat(129))).expect_err("too long");
        assert_eq!(err.details().expect("details")["code"], "too_long");
    }

    #[rstest]
    fn valid_key_is_returned() {
        let key = require_idempotency_key(&headers_with("order-42")).expect("valid");
        assert_eq!(key.as_ref(), "order-42");
    }
}
