//! Driving ports for the blog.

use async_trait::async_trait;

use crate::domain::{BlogPost, Caller, Error, Page, PageRequest, PostDraft, PostId, Slug};

/// Blog authoring; administrators only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogCommand: Send + Sync {
    async fn create(&self, caller: &Caller, draft: &PostDraft) -> Result<BlogPost, Error>;

    async fn update(
        &self,
        caller: &Caller,
        id: &PostId,
        draft: &PostDraft,
    ) -> Result<BlogPost, Error>;

    async fn publish(&self, caller: &Caller, id: &PostId) -> Result<BlogPost, Error>;
}

/// Blog reads. Anonymous readers pass `None` as the viewer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogQuery: Send + Sync {
    /// Published posts; administrators also see drafts.
    async fn list(&self, viewer: Option<Caller>, page: PageRequest)
    -> Result<Page<BlogPost>, Error>;

    /// Unpublished posts are `404` to everyone but administrators.
    async fn get(&self, viewer: Option<Caller>, slug: &Slug) -> Result<BlogPost, Error>;
}
