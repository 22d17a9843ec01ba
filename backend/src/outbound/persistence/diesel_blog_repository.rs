//! PostgreSQL-backed `BlogRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BlogRepository, BlogRepositoryError};
use crate::domain::{BlogPost, Page, PageRequest, PostDraft, PostId, Slug, UserId};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_conflicting_diesel_error};
use super::models::{BlogPostRow, NewBlogPostRow};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::{blog_posts, users};

/// Column order matching [`BlogPostRow`].
macro_rules! post_columns {
    () => {
        (
            blog_posts::id,
            blog_posts::author_id,
            users::display_name,
            blog_posts::slug,
            blog_posts::title,
            blog_posts::body,
            blog_posts::published_at,
            blog_posts::created_at,
            blog_posts::updated_at,
        )
    };
}

/// Diesel-backed implementation of the blog repository port.
#[derive(Clone)]
pub struct DieselBlogRepository {
    pool: DbPool,
}

impl DieselBlogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BlogRepositoryError {
    map_basic_pool_error(error, BlogRepositoryError::connection)
}

/// Map write failures; a unique violation can only be the slug.
fn map_write_error(error: diesel::result::Error, slug: &Slug) -> BlogRepositoryError {
    map_conflicting_diesel_error(
        error,
        || BlogRepositoryError::duplicate_slug(slug.as_ref()),
        BlogRepositoryError::query,
        BlogRepositoryError::connection,
    )
}

fn map_diesel_error(error: diesel::result::Error) -> BlogRepositoryError {
    map_conflicting_diesel_error(
        error,
        || BlogRepositoryError::query("unexpected unique constraint violation"),
        BlogRepositoryError::query,
        BlogRepositoryError::connection,
    )
}

fn row_to_post(row: BlogPostRow) -> Result<BlogPost, BlogRepositoryError> {
    let slug = Slug::new(row.slug)
        .map_err(|err| BlogRepositoryError::query(format!("stored slug invalid: {err}")))?;
    let author_name =
        row_decoding::display_name(row.author_name).map_err(BlogRepositoryError::query)?;
    Ok(BlogPost {
        id: PostId::from_uuid(row.id),
        author_id: UserId::from_uuid(row.author_id),
        author_name,
        slug,
        title: row.title,
        body: row.body,
        published_at: row.published_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl BlogRepository for DieselBlogRepository {
    async fn create(
        &self,
        id: &PostId,
        author: &UserId,
        draft: &PostDraft,
        at: DateTime<Utc>,
    ) -> Result<(), BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewBlogPostRow {
            id: *id.as_uuid(),
            author_id: *author.as_uuid(),
            slug: draft.slug.as_ref(),
            title: &draft.title,
            body: &draft.body,
            created_at: at,
            updated_at: at,
        };
        diesel::insert_into(blog_posts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_write_error(error, &draft.slug))
    }

    async fn update(
        &self,
        id: &PostId,
        draft: &PostDraft,
        at: DateTime<Utc>,
    ) -> Result<bool, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(blog_posts::table.find(*id.as_uuid()))
            .set((
                blog_posts::slug.eq(draft.slug.as_ref()),
                blog_posts::title.eq(&draft.title),
                blog_posts::body.eq(&draft.body),
                blog_posts::updated_at.eq(at),
            ))
            .execute(&mut conn)
            .await
            .map_err(|error| map_write_error(error, &draft.slug))?;
        Ok(updated > 0)
    }

    async fn publish(&self, id: &PostId, at: DateTime<Utc>) -> Result<bool, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            blog_posts::table
                .find(*id.as_uuid())
                .filter(blog_posts::published_at.is_null()),
        )
        .set((
            blog_posts::published_at.eq(Some(at)),
            blog_posts::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find(&self, id: &PostId) -> Result<Option<BlogPost>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BlogPostRow> = blog_posts::table
            .inner_join(users::table)
            .filter(blog_posts::id.eq(*id.as_uuid()))
            .select(post_columns!())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_post).transpose()
    }

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<BlogPost>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BlogPostRow> = blog_posts::table
            .inner_join(users::table)
            .filter(blog_posts::slug.eq(slug.as_ref()))
            .select(post_columns!())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_post).transpose()
    }

    async fn list(
        &self,
        include_drafts: bool,
        page: PageRequest,
    ) -> Result<Page<BlogPost>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = row_decoding::limit_offset(page);

        let mut count_query = blog_posts::table.into_boxed();
        let mut page_query = blog_posts::table
            .inner_join(users::table)
            .select(post_columns!())
            .into_boxed();
        if !include_drafts {
            count_query = count_query.filter(blog_posts::published_at.is_not_null());
            page_query = page_query.filter(blog_posts::published_at.is_not_null());
        }

        let total: i64 = count_query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<BlogPostRow> = page_query
            .order((
                blog_posts::published_at.desc().nulls_first(),
                blog_posts::created_at.desc(),
                blog_posts::id.desc(),
            ))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_post)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, row_decoding::total(total)))
    }
}
