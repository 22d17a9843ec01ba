//! Shared helpers for turning stored column values back into domain types.
//!
//! Every helper reports failures as a plain message; the calling repository
//! wraps it in its own `Query` error so corrupt rows never reach a handler
//! as a panic.

use std::str::FromStr;

use crate::domain::{DisplayName, Email, PageRequest, Role};

pub(super) fn display_name(raw: String) -> Result<DisplayName, String> {
    DisplayName::new(raw).map_err(|err| format!("stored display name invalid: {err}"))
}

pub(super) fn email(raw: &str) -> Result<Email, String> {
    Email::new(raw).map_err(|err| format!("stored email invalid: {err}"))
}

pub(super) fn role(raw: &str) -> Result<Role, String> {
    Role::from_str(raw).map_err(|err| format!("stored role invalid: {err}"))
}

/// Parse an enum column whose `FromStr` error is displayable.
pub(super) fn parse_column<T>(column: &'static str, raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(raw).map_err(|err| format!("stored {column} invalid: {err}"))
}

/// `LIMIT` and `OFFSET` values for a page request.
pub(super) fn limit_offset(page: PageRequest) -> (i64, i64) {
    (i64::from(page.limit()), i64::from(page.offset()))
}

/// Convert a SQL `COUNT(*)` into a page total.
pub(super) fn total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, TransactionStatus};
    use rstest::rstest;

    #[rstest]
    fn roles_round_trip_from_storage() {
        assert_eq!(role("investor"), Ok(Role::Investor));
        assert!(role("emperor").is_err());
    }

    #[rstest]
    fn enum_errors_name_the_column() {
        let err = parse_column::<TransactionStatus>("status", "LOST").expect_err("unknown status");
        assert!(err.starts_with("stored status invalid"));
        assert_eq!(parse_column::<Currency>("currency", "EUR"), Ok(Currency::Eur));
    }

    #[rstest]
    #[case(-1, 0)]
    #[case(0, 0)]
    #[case(42, 42)]
    fn totals_never_go_negative(#[case] count: i64, #[case] expected: u64) {
        assert_eq!(total(count), expected);
    }

    #[rstest]
    fn page_bounds_follow_request() {
        let page = PageRequest::new(Some(5), Some(10)).expect("valid page");
        assert_eq!(limit_offset(page), (5, 10));
    }
}
