//! Blog domain service. Authoring is restricted to administrators; drafts are
//! invisible to everyone else.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{BlogCommand, BlogQuery, BlogRepository, BlogRepositoryError};
use crate::domain::{BlogPost, Caller, Error, Page, PageRequest, PostDraft, PostId, Slug};

/// Blog service implementing the blog driving ports.
#[derive(Clone)]
pub struct BlogService<B> {
    posts: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<B> BlogService<B> {
    pub fn new(posts: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self { posts, clock }
    }
}

fn sees_drafts(viewer: Option<&Caller>) -> bool {
    viewer.is_some_and(Caller::is_admin)
}

impl<B> BlogService<B>
where
    B: BlogRepository,
{
    fn map_blog_error(error: BlogRepositoryError) -> Error {
        match error {
            BlogRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("blog repository unavailable: {message}"))
            }
            BlogRepositoryError::Query { message } => {
                Error::internal(format!("blog repository error: {message}"))
            }
            BlogRepositoryError::DuplicateSlug { slug } => {
                Error::conflict(format!("slug '{slug}' is already in use")).with_details(
                    serde_json::json!({ "field": "slug", "code": "duplicate_slug" }),
                )
            }
        }
    }

    async fn load(&self, id: &PostId) -> Result<BlogPost, Error> {
        self.posts
            .find(id)
            .await
            .map_err(Self::map_blog_error)?
            .ok_or_else(|| Error::not_found("post not found"))
    }
}

#[async_trait]
impl<B> BlogCommand for BlogService<B>
where
    B: BlogRepository,
{
    async fn create(&self, caller: &Caller, draft: &PostDraft) -> Result<BlogPost, Error> {
        caller.require_admin()?;
        let id = PostId::random();
        self.posts
            .create(&id, caller.user_id(), draft, self.clock.utc())
            .await
            .map_err(Self::map_blog_error)?;
        self.load(&id).await
    }

    async fn update(
        &self,
        caller: &Caller,
        id: &PostId,
        draft: &PostDraft,
    ) -> Result<BlogPost, Error> {
        caller.require_admin()?;
        let updated = self
            .posts
            .update(id, draft, self.clock.utc())
            .await
            .map_err(Self::map_blog_error)?;
        if !updated {
            return Err(Error::not_found("post not found"));
        }
        self.load(id).await
    }

    async fn publish(&self, caller: &Caller, id: &PostId) -> Result<BlogPost, Error> {
        caller.require_admin()?;
        let post = self.load(id).await?;
        if post.is_published() {
            return Ok(post);
        }
        self.posts
            .publish(id, self.clock.utc())
            .await
            .map_err(Self::map_blog_error)?;
        tracing::info!(post_id = %id, slug = %post.slug, "post published");
        self.load(id).await
    }
}

#[async_trait]
impl<B> BlogQuery for BlogService<B>
where
    B: BlogRepository,
{
    async fn list(
        &self,
        viewer: Option<Caller>,
        page: PageRequest,
    ) -> Result<Page<BlogPost>, Error> {
        self.posts
            .list(sees_drafts(viewer.as_ref()), page)
            .await
            .map_err(Self::map_blog_error)
    }

    async fn get(&self, viewer: Option<Caller>, slug: &Slug) -> Result<BlogPost, Error> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await
            .map_err(Self::map_blog_error)?
            .filter(|post| post.is_published() || sees_drafts(viewer.as_ref()));
        post.ok_or_else(|| Error::not_found("post not found"))
    }
}
