//! PostgreSQL-backed `ForumRepository` implementation using Diesel ORM.
//!
//! Thread reads aggregate their reply count in SQL. Deleting a thread
//! cascades to its replies at the schema level.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ForumRepository, ForumRepositoryError};
use crate::domain::{
    NewReply, NewThread, Page, PageRequest, Reply, ReplyId, Thread, ThreadId, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewReplyRow, NewThreadRow, ReplyRow, ThreadRow};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::{thread_replies, threads, users};

const THREAD_SELECT: &str = "\
SELECT t.id, t.author_id, u.display_name AS author_name, t.title, t.body, \
       t.created_at, COUNT(r.id) AS reply_count \
FROM threads t \
JOIN users u ON u.id = t.author_id \
LEFT JOIN thread_replies r ON r.thread_id = t.id ";

/// Diesel-backed implementation of the forum repository port.
#[derive(Clone)]
pub struct DieselForumRepository {
    pool: DbPool,
}

impl DieselForumRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ForumRepositoryError {
    map_basic_pool_error(error, ForumRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ForumRepositoryError {
    map_basic_diesel_error(
        error,
        ForumRepositoryError::query,
        ForumRepositoryError::connection,
    )
}

fn row_to_thread(row: ThreadRow) -> Result<Thread, ForumRepositoryError> {
    Ok(Thread {
        id: ThreadId::from_uuid(row.id),
        author_id: UserId::from_uuid(row.author_id),
        author_name: row_decoding::display_name(row.author_name)
            .map_err(ForumRepositoryError::query)?,
        title: row.title,
        body: row.body,
        reply_count: row.reply_count,
        created_at: row.created_at,
    })
}

fn row_to_reply(row: ReplyRow) -> Result<Reply, ForumRepositoryError> {
    Ok(Reply {
        id: ReplyId::from_uuid(row.id),
        thread_id: ThreadId::from_uuid(row.thread_id),
        author_id: UserId::from_uuid(row.author_id),
        author_name: row_decoding::display_name(row.author_name)
            .map_err(ForumRepositoryError::query)?,
        body: row.body,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ForumRepository for DieselForumRepository {
    async fn create_thread(
        &self,
        id: &ThreadId,
        author: &UserId,
        thread: &NewThread,
        at: DateTime<Utc>,
    ) -> Result<(), ForumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewThreadRow {
            id: *id.as_uuid(),
            author_id: *author.as_uuid(),
            title: &thread.title,
            body: &thread.body,
            created_at: at,
        };
        diesel::insert_into(threads::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_thread(&self, id: &ThreadId) -> Result<Option<Thread>, ForumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let sql = format!("{THREAD_SELECT}WHERE t.id = $1 GROUP BY t.id, u.display_name");
        let row: Option<ThreadRow> = diesel::sql_query(sql)
            .bind::<SqlUuid, _>(*id.as_uuid())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_thread).transpose()
    }

    async fn list_threads(&self, page: PageRequest) -> Result<Page<Thread>, ForumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = row_decoding::limit_offset(page);

        let total: i64 = threads::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let sql = format!(
            "{THREAD_SELECT}GROUP BY t.id, u.display_name \
             ORDER BY t.created_at DESC, t.id DESC LIMIT $1 OFFSET $2"
        );
        let rows: Vec<ThreadRow> = diesel::sql_query(sql)
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_thread)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, row_decoding::total(total)))
    }

    async fn list_replies(&self, id: &ThreadId) -> Result<Vec<Reply>, ForumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReplyRow> = thread_replies::table
            .inner_join(users::table.on(users::id.eq(thread_replies::author_id)))
            .filter(thread_replies::thread_id.eq(*id.as_uuid()))
            .select((
                thread_replies::id,
                thread_replies::thread_id,
                thread_replies::author_id,
                users::display_name,
                thread_replies::body,
                thread_replies::created_at,
            ))
            .order((thread_replies::created_at.asc(), thread_replies::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_reply).collect()
    }

    async fn create_reply(
        &self,
        id: &ReplyId,
        thread: &ThreadId,
        author: &UserId,
        reply: &NewReply,
        at: DateTime<Utc>,
    ) -> Result<Reply, ForumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReplyRow {
            id: *id.as_uuid(),
            thread_id: *thread.as_uuid(),
            author_id: *author.as_uuid(),
            body: &reply.body,
            created_at: at,
        };
        diesel::insert_into(thread_replies::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let author_name: String = users::table
            .find(*author.as_uuid())
            .select(users::display_name)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_reply(ReplyRow {
            id: row.id,
            thread_id: row.thread_id,
            author_id: row.author_id,
            author_name,
            body: reply.body.clone(),
            created_at: at,
        })
    }

    async fn delete_thread(&self, id: &ThreadId) -> Result<bool, ForumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(threads::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn threads_carry_reply_counts() {
        let thread = row_to_thread(ThreadRow {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author_name: "Grace Hopper".to_owned(),
            title: "Hiring a CTO".to_owned(),
            body: "Advice welcome.".to_owned(),
            reply_count: 4,
            created_at: Utc::now(),
        })
        .expect("valid row");
        assert_eq!(thread.reply_count, 4);
    }

    #[rstest]
    fn replies_with_blank_authors_are_query_errors() {
        let err = row_to_reply(ReplyRow {
            id: Uuid::new_v4(),
            thread_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author_name: "   ".to_owned(),
            body: "Same here".to_owned(),
            created_at: Utc::now(),
        })
        .expect_err("blank author");
        assert!(matches!(err, ForumRepositoryError::Query { .. }));
    }
}
