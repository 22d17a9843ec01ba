//! Port for blog posts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BlogPost, Page, PageRequest, PostDraft, PostId, Slug, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blog repository adapters.
    pub enum BlogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "blog repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "blog repository query failed: {message}",
        /// Another post already uses the slug.
        DuplicateSlug { slug: String } => "slug already in use: {slug}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Store an unpublished post.
    async fn create(
        &self,
        id: &PostId,
        author: &UserId,
        draft: &PostDraft,
        at: DateTime<Utc>,
    ) -> Result<(), BlogRepositoryError>;

    /// Replace a post's content. Returns `false` when it does not exist.
    async fn update(
        &self,
        id: &PostId,
        draft: &PostDraft,
        at: DateTime<Utc>,
    ) -> Result<bool, BlogRepositoryError>;

    /// Set the publication time unless already published. Returns `false`
    /// when the post does not exist.
    async fn publish(&self, id: &PostId, at: DateTime<Utc>) -> Result<bool, BlogRepositoryError>;

    async fn find(&self, id: &PostId) -> Result<Option<BlogPost>, BlogRepositoryError>;

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<BlogPost>, BlogRepositoryError>;

    /// Posts newest first; drafts only when `include_drafts` is set.
    async fn list(
        &self,
        include_drafts: bool,
        page: PageRequest,
    ) -> Result<Page<BlogPost>, BlogRepositoryError>;
}
