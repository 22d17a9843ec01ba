//! Blog posts authored by administrators.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::uuid_id;
use super::sanitize::{TextBoundsError, check_bounds, sanitize_inline, sanitize_multiline};
use super::slug::{Slug, SlugError};
use super::user::{DisplayName, UserId};

pub const POST_TITLE_MIN: usize = 3;
pub const POST_TITLE_MAX: usize = 160;
pub const POST_BODY_MAX: usize = 50_000;

uuid_id!(
    /// Identifier of a blog post.
    PostId
);

/// Validation errors for post drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    #[error("title {0}")]
    Title(TextBoundsError),
    #[error("body {0}")]
    Body(TextBoundsError),
    #[error("{0}")]
    Slug(SlugError),
}

impl PostValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Body(_) => "body",
            Self::Slug(_) => "slug",
        }
    }
}

/// Validated post content. The slug is derived from the title when omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub slug: Slug,
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn try_new(
        title: &str,
        body: &str,
        slug: Option<&str>,
    ) -> Result<Self, PostValidationError> {
        let title = sanitize_inline(title);
        check_bounds(&title, POST_TITLE_MIN, POST_TITLE_MAX).map_err(PostValidationError::Title)?;
        let body = sanitize_multiline(body);
        check_bounds(&body, 1, POST_BODY_MAX).map_err(PostValidationError::Body)?;
        let slug = match slug.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Slug::new(raw),
            None => Slug::from_title(&title),
        }
        .map_err(PostValidationError::Slug)?;
        Ok(Self { slug, title, body })
    }
}

/// Stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: PostId,
    pub author_id: UserId,
    pub author_name: DisplayName,
    pub slug: Slug,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}
