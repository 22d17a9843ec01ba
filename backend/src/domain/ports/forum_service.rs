//! Driving ports for community threads.

use async_trait::async_trait;

use crate::domain::{
    Caller, Error, NewReply, NewThread, Page, PageRequest, Reply, Thread, ThreadDetail, ThreadId,
};

/// Thread mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForumCommand: Send + Sync {
    async fn create_thread(&self, caller: &Caller, thread: &NewThread) -> Result<Thread, Error>;

    async fn reply(
        &self,
        caller: &Caller,
        thread: &ThreadId,
        reply: &NewReply,
    ) -> Result<Reply, Error>;

    /// Authors and administrators only.
    async fn delete_thread(&self, caller: &Caller, thread: &ThreadId) -> Result<(), Error>;
}

/// Thread reads; open to anonymous readers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForumQuery: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Page<Thread>, Error>;

    async fn get(&self, thread: &ThreadId) -> Result<ThreadDetail, Error>;
}
