//! Port for community threads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewReply, NewThread, Page, PageRequest, Reply, ReplyId, Thread, ThreadId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by forum repository adapters.
    pub enum ForumRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "forum repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "forum repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForumRepository: Send + Sync {
    async fn create_thread(
        &self,
        id: &ThreadId,
        author: &UserId,
        thread: &NewThread,
        at: DateTime<Utc>,
    ) -> Result<(), ForumRepositoryError>;

    async fn find_thread(&self, id: &ThreadId) -> Result<Option<Thread>, ForumRepositoryError>;

    /// Threads newest first.
    async fn list_threads(&self, page: PageRequest) -> Result<Page<Thread>, ForumRepositoryError>;

    /// Replies oldest first.
    async fn list_replies(&self, id: &ThreadId) -> Result<Vec<Reply>, ForumRepositoryError>;

    async fn create_reply(
        &self,
        id: &ReplyId,
        thread: &ThreadId,
        author: &UserId,
        reply: &NewReply,
        at: DateTime<Utc>,
    ) -> Result<Reply, ForumRepositoryError>;

    /// Delete a thread with its replies. Returns `false` when it did not exist.
    async fn delete_thread(&self, id: &ThreadId) -> Result<bool, ForumRepositoryError>;
}
