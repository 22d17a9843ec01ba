//! URL slugs for blog posts.
//!
//! Slugs are non-empty identifiers composed of lowercase ASCII letters,
//! digits, and single hyphens, never starting or ending with a hyphen.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest accepted slug.
pub const SLUG_MAX: usize = 96;

/// Validation errors for [`Slug`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits, and single hyphens")]
    InvalidCharacters,
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

fn has_clean_hyphens(value: &str) -> bool {
    !value.starts_with('-') && !value.ends_with('-') && !value.contains("--")
}

/// Validated slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if value.len() > SLUG_MAX {
            return Err(SlugError::TooLong { max: SLUG_MAX });
        }
        if !has_allowed_slug_chars(&value) || !has_clean_hyphens(&value) {
            return Err(SlugError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Derive a slug from free text such as a title.
    ///
    /// ASCII letters are lowercased, digits kept, and every other run of
    /// characters becomes one hyphen.
    ///
    /// # Examples
    /// ```
    /// use dfds_backend::domain::Slug;
    ///
    /// let slug = Slug::from_title("Hello, World! 2025 Edition").unwrap();
    /// assert_eq!(slug.as_ref(), "hello-world-2025-edition");
    /// ```
    pub fn from_title(title: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(title.len());
        for ch in title.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let mut slug = slug.trim_end_matches('-').to_owned();
        if slug.len() > SLUG_MAX {
            slug.truncate(SLUG_MAX);
            slug = slug.trim_end_matches('-').to_owned();
        }
        Self::new(slug)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
