//! Feature requests and voting.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::uuid_id;
use super::sanitize::{TextBoundsError, check_bounds, sanitize_inline, sanitize_multiline};
use super::user::{DisplayName, UserId};

pub const FEATURE_TITLE_MIN: usize = 3;
pub const FEATURE_TITLE_MAX: usize = 120;
pub const FEATURE_DESCRIPTION_MAX: usize = 2_000;

uuid_id!(
    /// Identifier of a feature request.
    FeatureId
);

/// Delivery state of a feature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureStatus {
    Planned,
    InProgress,
    Done,
}

impl FeatureStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl FromStr for FeatureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLANNED" => Ok(Self::Planned),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            other => Err(format!("unknown feature status '{other}'")),
        }
    }
}

/// Validation errors for feature requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureValidationError {
    #[error("title {0}")]
    Title(TextBoundsError),
    #[error("description {0}")]
    Description(TextBoundsError),
}

impl FeatureValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Description(_) => "description",
        }
    }
}

/// Validated feature request submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeature {
    pub title: String,
    pub description: String,
}

impl NewFeature {
    pub fn try_new(title: &str, description: Option<&str>) -> Result<Self, FeatureValidationError> {
        let title = sanitize_inline(title);
        check_bounds(&title, FEATURE_TITLE_MIN, FEATURE_TITLE_MAX)
            .map_err(FeatureValidationError::Title)?;
        let description = description.map(sanitize_multiline).unwrap_or_default();
        check_bounds(&description, 0, FEATURE_DESCRIPTION_MAX)
            .map_err(FeatureValidationError::Description)?;
        Ok(Self { title, description })
    }
}

/// Feature request as listed to a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    pub id: FeatureId,
    pub author_id: UserId,
    pub author_name: DisplayName,
    pub title: String,
    pub description: String,
    pub status: FeatureStatus,
    pub vote_count: i64,
    pub voted_by_viewer: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ab", None, "title")]
    #[case("<p></p>", None, "title")]
    #[case("Dark mode", Some("d".repeat(FEATURE_DESCRIPTION_MAX + 1)), "description")]
    fn rejects_invalid_submissions(
        #[case] title: &str,
        #[case] description: Option<String>,
        #[case] field: &str,
    ) {
        let err = NewFeature::try_new(title, description.as_deref()).expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn description_is_optional_and_sanitised() {
        let feature = NewFeature::try_new("Dark mode", None).expect("valid");
        assert_eq!(feature.description, "");
        let feature =
            NewFeature::try_new("Dark <em>mode</em>", Some("<script>x</script>Please")).expect("valid");
        assert_eq!(feature.title, "Dark mode");
        assert_eq!(feature.description, "Please");
    }

    #[rstest]
    #[case(FeatureStatus::Planned)]
    #[case(FeatureStatus::InProgress)]
    #[case(FeatureStatus::Done)]
    fn status_round_trips(#[case] status: FeatureStatus) {
        assert_eq!(status.as_str().parse::<FeatureStatus>(), Ok(status));
    }
}
