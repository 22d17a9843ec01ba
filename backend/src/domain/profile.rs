//! Public profiles and discovery filters.
//!
//! ## Field visibility
//! - `contactEmail` is shown to the profile owner and administrators.
//! - `investmentFocus` is shown to the owner, administrators, and founders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use super::caller::Caller;
use super::sanitize::{sanitize_inline, sanitize_multiline};
use super::user::{DisplayName, Email, Role, UserId, UserValidationError};

pub const HEADLINE_MAX: usize = 120;
pub const BIO_MAX: usize = 2_000;
pub const SKILLS_MAX: usize = 20;
pub const SKILL_MAX: usize = 32;
pub const LOCATION_MAX: usize = 120;
pub const WEBSITE_MAX: usize = 2_048;
pub const INVESTMENT_FOCUS_MAX: usize = 500;
pub const SEARCH_MAX: usize = 100;

/// Validation errors for profile updates and discovery filters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("headline must be at most {max} characters")]
    HeadlineTooLong { max: usize },
    #[error("bio must be at most {max} characters")]
    BioTooLong { max: usize },
    #[error("at most {max} skills are allowed")]
    TooManySkills { max: usize },
    #[error("each skill must be between 1 and {max} characters")]
    InvalidSkill { max: usize },
    #[error("location must be at most {max} characters")]
    LocationTooLong { max: usize },
    #[error("website must be an http or https URL")]
    InvalidWebsite,
    #[error("{0}")]
    ContactEmail(UserValidationError),
    #[error("investment focus must be at most {max} characters")]
    InvestmentFocusTooLong { max: usize },
    #[error("only investors may set an investment focus")]
    InvestmentFocusNotAllowed,
    #[error("search must be at most {max} characters")]
    SearchTooLong { max: usize },
}

impl ProfileValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::HeadlineTooLong { .. } => "headline",
            Self::BioTooLong { .. } => "bio",
            Self::TooManySkills { .. } | Self::InvalidSkill { .. } => "skills",
            Self::LocationTooLong { .. } => "location",
            Self::InvalidWebsite => "website",
            Self::ContactEmail(_) => "contactEmail",
            Self::InvestmentFocusTooLong { .. } | Self::InvestmentFocusNotAllowed => {
                "investmentFocus"
            }
            Self::SearchTooLong { .. } => "q",
        }
    }
}

/// Raw profile fields submitted by the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileInput {
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub investment_focus: Option<String>,
}

/// Validated, sanitised profile fields ready to store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<Email>,
    pub investment_focus: Option<String>,
}

fn bounded(
    value: Option<&str>,
    clean: fn(&str) -> String,
    max: usize,
    error: ProfileValidationError,
) -> Result<Option<String>, ProfileValidationError> {
    let cleaned = value.map(clean).filter(|text| !text.is_empty());
    match cleaned {
        Some(text) if text.chars().count() > max => Err(error),
        other => Ok(other),
    }
}

fn normalise_skills(raw: &[String]) -> Result<Vec<String>, ProfileValidationError> {
    if raw.len() > SKILLS_MAX {
        return Err(ProfileValidationError::TooManySkills { max: SKILLS_MAX });
    }
    let mut skills: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let skill = sanitize_inline(entry);
        let length = skill.chars().count();
        if length == 0 || length > SKILL_MAX {
            return Err(ProfileValidationError::InvalidSkill { max: SKILL_MAX });
        }
        if !skills.iter().any(|known| known.eq_ignore_ascii_case(&skill)) {
            skills.push(skill);
        }
    }
    Ok(skills)
}

fn normalise_website(raw: Option<&str>) -> Result<Option<String>, ProfileValidationError> {
    let Some(trimmed) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    if trimmed.len() > WEBSITE_MAX {
        return Err(ProfileValidationError::InvalidWebsite);
    }
    let url = Url::parse(trimmed).map_err(|_| ProfileValidationError::InvalidWebsite)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ProfileValidationError::InvalidWebsite);
    }
    Ok(Some(url.to_string()))
}

impl ProfileUpdate {
    /// Validate `input` for an owner holding `role`.
    pub fn try_new(input: &ProfileInput, role: Role) -> Result<Self, ProfileValidationError> {
        let headline = bounded(
            input.headline.as_deref(),
            sanitize_inline,
            HEADLINE_MAX,
            ProfileValidationError::HeadlineTooLong { max: HEADLINE_MAX },
        )?;
        let bio = bounded(
            input.bio.as_deref(),
            sanitize_multiline,
            BIO_MAX,
            ProfileValidationError::BioTooLong { max: BIO_MAX },
        )?;
        let skills = normalise_skills(&input.skills)?;
        let location = bounded(
            input.location.as_deref(),
            sanitize_inline,
            LOCATION_MAX,
            ProfileValidationError::LocationTooLong { max: LOCATION_MAX },
        )?;
        let website = normalise_website(input.website.as_deref())?;
        let contact_email = input
            .contact_email
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(Email::new)
            .transpose()
            .map_err(ProfileValidationError::ContactEmail)?;
        let investment_focus = bounded(
            input.investment_focus.as_deref(),
            sanitize_multiline,
            INVESTMENT_FOCUS_MAX,
            ProfileValidationError::InvestmentFocusTooLong {
                max: INVESTMENT_FOCUS_MAX,
            },
        )?;
        if investment_focus.is_some() && role != Role::Investor {
            return Err(ProfileValidationError::InvestmentFocusNotAllowed);
        }

        Ok(Self {
            headline,
            bio,
            skills,
            location,
            website,
            contact_email,
            investment_focus,
        })
    }
}

/// Stored profile joined with its owner's public identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub role: Role,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<Email>,
    pub investment_focus: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile as rendered to a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub role: Role,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_focus: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Render the profile for `viewer`, hiding restricted fields.
    pub fn view_for(self, viewer: &Caller) -> ProfileView {
        let is_owner = viewer.user_id() == &self.user_id;
        let is_admin = viewer.role().is_admin();
        let sees_contact = is_owner || is_admin;
        let sees_focus = is_owner || is_admin || viewer.role() == Role::Founder;
        ProfileView {
            user_id: self.user_id,
            display_name: self.display_name,
            role: self.role,
            headline: self.headline,
            bio: self.bio,
            skills: self.skills,
            location: self.location,
            website: self.website,
            contact_email: self.contact_email.filter(|_| sees_contact),
            investment_focus: self.investment_focus.filter(|_| sees_focus),
            updated_at: self.updated_at,
        }
    }
}

/// Discovery filters; every present filter must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFilter {
    pub role: Option<Role>,
    pub skill: Option<String>,
    pub search: Option<String>,
}

impl ProfileFilter {
    /// Normalise raw query parameters.
    pub fn try_new(
        role: Option<Role>,
        skill: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, ProfileValidationError> {
        let skill = skill.map(sanitize_inline).filter(|text| !text.is_empty());
        if skill
            .as_ref()
            .is_some_and(|text| text.chars().count() > SKILL_MAX)
        {
            return Err(ProfileValidationError::InvalidSkill { max: SKILL_MAX });
        }
        let search = search.map(sanitize_inline).filter(|text| !text.is_empty());
        if search
            .as_ref()
            .is_some_and(|text| text.chars().count() > SEARCH_MAX)
        {
            return Err(ProfileValidationError::SearchTooLong { max: SEARCH_MAX });
        }
        Ok(Self {
            role,
            skill,
            search,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuthenticatedUser;
    use rstest::rstest;

    fn profile(owner: &UserId) -> Profile {
        Profile {
            user_id: owner.clone(),
            display_name: DisplayName::new("Ivy Investor").expect("name"),
            role: Role::Investor,
            headline: Some("Angel".into()),
            bio: None,
            skills: vec!["fintech".into()],
            location: None,
            website: None,
            contact_email: Some(Email::new("ivy@example.com").expect("email")),
            investment_focus: Some("Seed B2B".into()),
            updated_at: None,
        }
    }

    fn viewer(id: UserId, role: Role) -> Caller {
        Caller::from_session(AuthenticatedUser::new(id, role))
    }

    #[rstest]
    #[case(Role::Developer, false, false)]
    #[case(Role::Investor, false, false)]
    #[case(Role::Founder, false, true)]
    #[case(Role::Admin, true, true)]
    fn restricted_fields_follow_viewer_role(
        #[case] role: Role,
        #[case] sees_contact: bool,
        #[case] sees_focus: bool,
    ) {
        let owner = UserId::random();
        let view = profile(&owner).view_for(&viewer(UserId::random(), role));
        assert_eq!(view.contact_email.is_some(), sees_contact);
        assert_eq!(view.investment_focus.is_some(), sees_focus);
    }

    #[rstest]
    fn owner_sees_everything() {
        let owner = UserId::random();
        let view = profile(&owner).view_for(&viewer(owner.clone(), Role::Investor));
        assert!(view.contact_email.is_some());
        assert!(view.investment_focus.is_some());
    }

    #[rstest]
    fn hidden_fields_are_omitted_from_json() {
        let owner = UserId::random();
        let view = profile(&owner).view_for(&viewer(UserId::random(), Role::Developer));
        let json = serde_json::to_value(&view).expect("serialise");
        assert!(json.get("contactEmail").is_none());
        assert!(json.get("investmentFocus").is_none());
        assert_eq!(json["headline"], "Angel");
    }

    #[rstest]
    fn update_sanitises_and_deduplicates() {
        let input = ProfileInput {
            headline: Some(" Builder <script>x</script> ".into()),
            bio: Some("Line one\r\n\r\n\r\nLine two".into()),
            skills: vec!["Rust".into(), "rust".into(), "Go".into()],
            website: Some("https://example.com".into()),
            ..ProfileInput::default()
        };
        let update = ProfileUpdate::try_new(&input, Role::Developer).expect("valid");
        assert_eq!(update.headline.as_deref(), Some("Builder"));
        assert_eq!(update.bio.as_deref(), Some("Line one\n\nLine two"));
        assert_eq!(update.skills, vec!["Rust".to_owned(), "Go".to_owned()]);
        assert_eq!(update.website.as_deref(), Some("https://example.com/"));
    }

    #[rstest]
    #[case(ProfileInput { website: Some("ftp://example.com".into()), ..ProfileInput::default() }, "website")]
    #[case(ProfileInput { website: Some("javascript:alert(1)".into()), ..ProfileInput::default() }, "website")]
    #[case(ProfileInput { skills: vec!["x".into(); 21], ..ProfileInput::default() }, "skills")]
    #[case(ProfileInput { skills: vec!["a".repeat(33)], ..ProfileInput::default() }, "skills")]
    #[case(ProfileInput { headline: Some("h".repeat(121)), ..ProfileInput::default() }, "headline")]
    #[case(ProfileInput { contact_email: Some("nope".into()), ..ProfileInput::default() }, "contactEmail")]
    #[case(ProfileInput { investment_focus: Some("Seed".into()), ..ProfileInput::default() }, "investmentFocus")]
    fn update_rejects_invalid_fields(#[case] input: ProfileInput, #[case] field: &str) {
        let err = ProfileUpdate::try_new(&input, Role::Founder).expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn investors_may_set_focus() {
        let input = ProfileInput {
            investment_focus: Some("Climate".into()),
            ..ProfileInput::default()
        };
        let update = ProfileUpdate::try_new(&input, Role::Investor).expect("valid");
        assert_eq!(update.investment_focus.as_deref(), Some("Climate"));
    }

    #[rstest]
    fn filter_drops_blank_values() {
        let filter = ProfileFilter::try_new(None, Some("  "), Some("<b></b>")).expect("valid");
        assert_eq!(filter, ProfileFilter::default());
    }
}
