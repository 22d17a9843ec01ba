//! Community forum domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{ForumCommand, ForumQuery, ForumRepository, ForumRepositoryError};
use crate::domain::{
    Caller, Error, NewReply, NewThread, Page, PageRequest, Permission, Reply, ReplyId, Thread,
    ThreadDetail, ThreadId,
};

/// Forum service implementing the forum driving ports.
#[derive(Clone)]
pub struct ForumService<F> {
    forum: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> ForumService<F> {
    pub fn new(forum: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { forum, clock }
    }
}

impl<F> ForumService<F>
where
    F: ForumRepository,
{
    fn map_forum_error(error: ForumRepositoryError) -> Error {
        match error {
            ForumRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("forum repository unavailable: {message}"))
            }
            ForumRepositoryError::Query { message } => {
                Error::internal(format!("forum repository error: {message}"))
            }
        }
    }

    async fn load(&self, id: &ThreadId) -> Result<Thread, Error> {
        self.forum
            .find_thread(id)
            .await
            .map_err(Self::map_forum_error)?
            .ok_or_else(|| Error::not_found("thread not found"))
    }
}

#[async_trait]
impl<F> ForumCommand for ForumService<F>
where
    F: ForumRepository,
{
    async fn create_thread(&self, caller: &Caller, thread: &NewThread) -> Result<Thread, Error> {
        caller.require(Permission::Write)?;
        let id = ThreadId::random();
        self.forum
            .create_thread(&id, caller.user_id(), thread, self.clock.utc())
            .await
            .map_err(Self::map_forum_error)?;
        self.load(&id).await
    }

    async fn reply(
        &self,
        caller: &Caller,
        thread: &ThreadId,
        reply: &NewReply,
    ) -> Result<Reply, Error> {
        caller.require(Permission::Write)?;
        self.load(thread).await?;
        self.forum
            .create_reply(
                &ReplyId::random(),
                thread,
                caller.user_id(),
                reply,
                self.clock.utc(),
            )
            .await
            .map_err(Self::map_forum_error)
    }

    async fn delete_thread(&self, caller: &Caller, thread: &ThreadId) -> Result<(), Error> {
        caller.require(Permission::Write)?;
        let existing = self.load(thread).await?;
        if &existing.author_id != caller.user_id() && !caller.is_admin() {
            return Err(Error::forbidden("only the author may delete this thread"));
        }
        if !self
            .forum
            .delete_thread(thread)
            .await
            .map_err(Self::map_forum_error)?
        {
            return Err(Error::not_found("thread not found"));
        }
        tracing::info!(thread_id = %thread, "thread deleted");
        Ok(())
    }
}

#[async_trait]
impl<F> ForumQuery for ForumService<F>
where
    F: ForumRepository,
{
    async fn list(&self, page: PageRequest) -> Result<Page<Thread>, Error> {
        self.forum
            .list_threads(page)
            .await
            .map_err(Self::map_forum_error)
    }

    async fn get(&self, id: &ThreadId) -> Result<ThreadDetail, Error> {
        let thread = self.load(id).await?;
        let replies = self
            .forum
            .list_replies(id)
            .await
            .map_err(Self::map_forum_error)?;
        Ok(ThreadDetail { thread, replies })
    }
}
