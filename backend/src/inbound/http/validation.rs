//! Shared validation helpers for inbound HTTP adapters.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, PageRequest, PageRequestError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

pub(crate) fn invalid_value_error(field: FieldName, message: impl Into<String>) -> Error {
    field_error(field, ErrorCode::InvalidValue, message.into())
}

/// Parse a UUID path or body segment, reporting the field on failure.
pub(crate) fn parse_uuid(raw: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        let name = field.as_str();
        Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
            "field": name,
            "value": raw,
            "code": ErrorCode::InvalidUuid.as_str(),
        }))
    })
}

/// Shared `limit` / `offset` query parameters.
#[derive(Debug, Default, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size between 1 and 100; defaults to 20.
    pub limit: Option<u32>,
    /// Number of items to skip; defaults to 0.
    pub offset: Option<u32>,
}

impl PageQuery {
    pub(crate) fn to_request(&self) -> Result<PageRequest, Error> {
        PageRequest::new(self.limit, self.offset).map_err(|err| match err {
            PageRequestError::LimitOutOfRange { .. } => {
                field_error(FieldName::new("limit"), ErrorCode::OutOfRange, err.to_string())
            }
        })
    }
}

/// Turn malformed JSON bodies into the standard `400 invalid_request` envelope.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "rejected JSON payload");
    let error = match &err {
        JsonPayloadError::ContentType => {
            Error::invalid_request("request body must be application/json")
        }
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            Error::invalid_request("request body is too large")
        }
        other => Error::invalid_request(format!("invalid JSON body: {other}")),
    };
    error.into()
}

/// Turn malformed query strings into the standard `400 invalid_request` envelope.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}")).into()
}

/// JSON extractor configuration used by every API scope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(json_error_handler)
}

/// Query extractor configuration used by every API scope.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    #[rstest]
    fn parse_uuid_reports_field_and_value() {
        let err = parse_uuid("nope", FieldName::new("id")).expect_err("invalid");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "id");
        assert_eq!(details["value"], "nope");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case(None, None, 20, 0)]
    #[case(Some(5), Some(10), 5, 10)]
    fn page_query_defaults_and_passes_through(
        #[case] limit: Option<u32>,
        #[case] offset: Option<u32>,
        #[case] expected_limit: u32,
        #[case] expected_offset: u32,
    ) {
        let page = PageQuery { limit, offset }.to_request().expect("valid");
        assert_eq!(page.limit(), expected_limit);
        assert_eq!(page.offset(), expected_offset);
    }

    #[rstest]
    #[case(0)]
    #[case(101)]
    fn page_query_rejects_out_of_range_limits(#[case] limit: u32) {
        let err = PageQuery {
            limit: Some(limit),
            offset: None,
        }
        .to_request()
        .expect_err("out of range");
        assert_eq!(err.details().expect("details")["field"], "limit");
    }

    #[rstest]
    fn missing_field_names_the_field() {
        let err = missing_field_error(FieldName::new("token"));
        assert_eq!(err.message(), "missing required field: token");
        assert_eq!(err.details().expect("details")["code"], "missing_field");
    }
}
