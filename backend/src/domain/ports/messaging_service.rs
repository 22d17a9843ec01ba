//! Driving ports for direct messaging.

use async_trait::async_trait;

use crate::domain::{
    Caller, Conversation, ConversationId, Error, Message, MessageBody, Page, PageRequest, UserId,
};

/// Messaging mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingCommand: Send + Sync {
    /// Return the caller's direct conversation with `other`, creating it when
    /// none exists.
    async fn start_conversation(
        &self,
        caller: &Caller,
        other: &UserId,
    ) -> Result<Conversation, Error>;

    /// Store a message and publish `message:new`.
    async fn send_message(
        &self,
        caller: &Caller,
        conversation: &ConversationId,
        body: MessageBody,
    ) -> Result<Message, Error>;

    /// Publish a `typing` signal.
    async fn typing(&self, caller: &Caller, conversation: &ConversationId) -> Result<(), Error>;
}

/// Messaging reads; participants only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingQuery: Send + Sync {
    async fn conversations(
        &self,
        caller: &Caller,
        page: PageRequest,
    ) -> Result<Page<Conversation>, Error>;

    async fn messages(
        &self,
        caller: &Caller,
        conversation: &ConversationId,
        page: PageRequest,
    ) -> Result<Page<Message>, Error>;
}
