//! Port for conversations and messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Conversation, ConversationId, Message, Page, PageRequest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by conversation repository adapters.
    pub enum ConversationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "conversation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "conversation repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// The direct conversation between exactly `a` and `b`, if any.
    async fn find_direct(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, ConversationRepositoryError>;

    /// Create a conversation with the given participants.
    async fn create(
        &self,
        id: &ConversationId,
        participants: &[UserId],
        at: DateTime<Utc>,
    ) -> Result<Conversation, ConversationRepositoryError>;

    async fn find(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConversationRepositoryError>;

    /// Conversations `user` takes part in, most recent activity first.
    async fn list_for_user(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<Conversation>, ConversationRepositoryError>;

    /// Store a message and bump the conversation's activity time.
    async fn insert_message(&self, message: &Message) -> Result<(), ConversationRepositoryError>;

    /// Messages in `id`, newest first.
    async fn list_messages(
        &self,
        id: &ConversationId,
        page: PageRequest,
    ) -> Result<Page<Message>, ConversationRepositoryError>;
}
