//! Direct messaging domain service.
//!
//! Messages are persisted before they are published. Publication is best
//! effort: a failed publish is logged and the request still succeeds, since
//! clients reconcile by re-listing messages.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    ConversationRepository, ConversationRepositoryError, MessagingCommand, MessagingQuery,
    RealtimePublisher, UserRepository,
};
use crate::domain::{
    Caller, Conversation, ConversationId, Error, Message, MessageBody, MessageId, Page,
    PageRequest, Permission, RealtimeEvent, UserId,
};

/// Messaging service implementing the messaging driving ports.
///
/// The publisher may be a trait object so the adapter can be chosen from
/// configuration at start-up.
pub struct MessagingService<C, U, P: ?Sized> {
    conversations: Arc<C>,
    users: Arc<U>,
    publisher: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<C, U, P: ?Sized> MessagingService<C, U, P> {
    pub fn new(
        conversations: Arc<C>,
        users: Arc<U>,
        publisher: Arc<P>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            conversations,
            users,
            publisher,
            clock,
        }
    }
}

impl<C, U, P> MessagingService<C, U, P>
where
    C: ConversationRepository,
    U: UserRepository,
    P: RealtimePublisher + ?Sized,
{
    fn map_conversation_error(error: ConversationRepositoryError) -> Error {
        match error {
            ConversationRepositoryError::Connection { message } => Error::service_unavailable(
                format!("conversation repository unavailable: {message}"),
            ),
            ConversationRepositoryError::Query { message } => {
                Error::internal(format!("conversation repository error: {message}"))
            }
        }
    }

    /// Load a conversation the caller takes part in.
    async fn participating(
        &self,
        caller: &Caller,
        id: &ConversationId,
    ) -> Result<Conversation, Error> {
        let conversation = self
            .conversations
            .find(id)
            .await
            .map_err(Self::map_conversation_error)?
            .ok_or_else(|| Error::not_found("conversation not found"))?;
        if conversation.includes(caller.user_id()) {
            Ok(conversation)
        } else {
            Err(Error::forbidden("not a participant in this conversation"))
        }
    }

    async fn publish(&self, event: RealtimeEvent) {
        if let Err(error) = self.publisher.publish(&event).await {
            tracing::warn!(channel = %event.channel, event = event.name, %error, "realtime publish failed");
        }
    }
}

#[async_trait]
impl<C, U, P> MessagingCommand for MessagingService<C, U, P>
where
    C: ConversationRepository,
    U: UserRepository,
    P: RealtimePublisher + ?Sized,
{
    async fn start_conversation(
        &self,
        caller: &Caller,
        other: &UserId,
    ) -> Result<Conversation, Error> {
        caller.require(Permission::Write)?;
        if other == caller.user_id() {
            return Err(Error::invalid_field(
                "userId",
                "self_conversation",
                "cannot start a conversation with yourself",
            ));
        }
        if self
            .users
            .find_by_id(other)
            .await
            .map_err(map_user_error)?
            .is_none()
        {
            return Err(Error::not_found("user not found"));
        }

        if let Some(existing) = self
            .conversations
            .find_direct(caller.user_id(), other)
            .await
            .map_err(Self::map_conversation_error)?
        {
            return Ok(existing);
        }
        let participants = [caller.user_id().clone(), other.clone()];
        self.conversations
            .create(&ConversationId::random(), &participants, self.clock.utc())
            .await
            .map_err(Self::map_conversation_error)
    }

    async fn send_message(
        &self,
        caller: &Caller,
        conversation: &ConversationId,
        body: MessageBody,
    ) -> Result<Message, Error> {
        caller.require(Permission::Write)?;
        let conversation = self.participating(caller, conversation).await?;
        let message = Message {
            id: MessageId::random(),
            conversation_id: conversation.id,
            sender_id: caller.user_id().clone(),
            body: body.into(),
            created_at: self.clock.utc(),
        };
        self.conversations
            .insert_message(&message)
            .await
            .map_err(Self::map_conversation_error)?;
        self.publish(RealtimeEvent::message_new(&message)).await;
        Ok(message)
    }

    async fn typing(&self, caller: &Caller, conversation: &ConversationId) -> Result<(), Error> {
        caller.require(Permission::Write)?;
        let conversation = self.participating(caller, conversation).await?;
        self.publish(RealtimeEvent::typing(
            &conversation.id,
            caller.user_id(),
            self.clock.utc(),
        ))
        .await;
        Ok(())
    }
}

#[async_trait]
impl<C, U, P> MessagingQuery for MessagingService<C, U, P>
where
    C: ConversationRepository,
    U: UserRepository,
    P: RealtimePublisher + ?Sized,
{
    async fn conversations(
        &self,
        caller: &Caller,
        page: PageRequest,
    ) -> Result<Page<Conversation>, Error> {
        caller.require(Permission::Read)?;
        self.conversations
            .list_for_user(caller.user_id(), page)
            .await
            .map_err(Self::map_conversation_error)
    }

    async fn messages(
        &self,
        caller: &Caller,
        conversation: &ConversationId,
        page: PageRequest,
    ) -> Result<Page<Message>, Error> {
        caller.require(Permission::Read)?;
        let conversation = self.participating(caller, conversation).await?;
        self.conversations
            .list_messages(&conversation.id, page)
            .await
            .map_err(Self::map_conversation_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockConversationRepository, MockRealtimePublisher, MockUserRepository,
        RealtimePublishError,
    };
    use crate::domain::{
        DisplayName, ErrorCode, MESSAGE_NEW_EVENT, Participant, Role, TYPING_EVENT,
        conversation_channel,
    };
    use crate::test_support::{fixture_clock, fixture_timestamp, session_caller, user_with};
    use rstest::rstest;

    type Service =
        MessagingService<MockConversationRepository, MockUserRepository, MockRealtimePublisher>;

    fn service(
        conversations: MockConversationRepository,
        users: MockUserRepository,
        publisher: MockRealtimePublisher,
    ) -> Service {
        MessagingService::new(
            Arc::new(conversations),
            Arc::new(users),
            Arc::new(publisher),
            fixture_clock(),
        )
    }

    fn conversation_with(members: &[&UserId]) -> Conversation {
        Conversation {
            id: ConversationId::random(),
            participants: members
                .iter()
                .map(|id| Participant {
                    user_id: (*id).clone(),
                    display_name: DisplayName::new("Member").expect("name"),
                })
                .collect(),
            created_at: fixture_timestamp(),
            last_message_at: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn send_persists_then_publishes_to_conversation_channel() {
        let caller = session_caller(Role::Founder);
        let conversation = conversation_with(&[caller.user_id(), &UserId::random()]);
        let channel = conversation_channel(&conversation.id);
        let mut conversations = MockConversationRepository::new();
        let mut order = mockall::Sequence::new();
        conversations
            .expect_find()
            .return_once(move |_| Ok(Some(conversation)));
        conversations
            .expect_insert_message()
            .withf(|message| message.body == "hello there")
            .times(1)
            .in_sequence(&mut order)
            .return_once(|_| Ok(()));
        let mut publisher = MockRealtimePublisher::new();
        publisher
            .expect_publish()
            .withf(move |event| event.channel == channel && event.name == MESSAGE_NEW_EVENT)
            .times(1)
            .in_sequence(&mut order)
            .return_once(|_| Ok(()));

        let body = MessageBody::try_new("hello <i>there</i>").expect("valid");
        let message = service(conversations, MockUserRepository::new(), publisher)
            .send_message(&caller, &ConversationId::random(), body)
            .await
            .expect("sent");
        assert_eq!(message.created_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn publish_failure_does_not_fail_send() {
        let caller = session_caller(Role::Developer);
        let conversation = conversation_with(&[caller.user_id(), &UserId::random()]);
        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_find()
            .return_once(move |_| Ok(Some(conversation)));
        conversations
            .expect_insert_message()
            .return_once(|_| Ok(()));
        let mut publisher = MockRealtimePublisher::new();
        publisher
            .expect_publish()
            .return_once(|_| Err(RealtimePublishError::rejected(502_u16)));

        let body = MessageBody::try_new("still delivered").expect("valid");
        let result = service(conversations, MockUserRepository::new(), publisher)
            .send_message(&caller, &ConversationId::random(), body)
            .await;
        assert!(result.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn non_participants_cannot_read_messages() {
        let conversation = conversation_with(&[&UserId::random(), &UserId::random()]);
        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_find()
            .return_once(move |_| Ok(Some(conversation)));
        conversations.expect_list_messages().times(0);

        let err = service(
            conversations,
            MockUserRepository::new(),
            MockRealtimePublisher::new(),
        )
        .messages(
            &session_caller(Role::Admin),
            &ConversationId::random(),
            PageRequest::default(),
        )
        .await
        .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn start_reuses_existing_direct_conversation() {
        let caller = session_caller(Role::Investor);
        let other = UserId::random();
        let existing = conversation_with(&[caller.user_id(), &other]);
        let existing_id = existing.id;
        let mut users = MockUserRepository::new();
        let other_user = user_with(&other, "other@example.com", Role::Founder);
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(other_user)));
        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_find_direct()
            .return_once(move |_, _| Ok(Some(existing)));
        conversations.expect_create().times(0);

        let conversation = service(conversations, users, MockRealtimePublisher::new())
            .start_conversation(&caller, &other)
            .await
            .expect("reused");
        assert_eq!(conversation.id, existing_id);
    }

    #[rstest]
    #[tokio::test]
    async fn start_creates_conversation_when_none_exists() {
        let caller = session_caller(Role::Investor);
        let other = UserId::random();
        let created = conversation_with(&[caller.user_id(), &other]);
        let mut users = MockUserRepository::new();
        let other_user = user_with(&other, "other@example.com", Role::Founder);
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(other_user)));
        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_find_direct()
            .return_once(|_, _| Ok(None));
        conversations
            .expect_create()
            .withf(|_, participants, _| participants.len() == 2)
            .times(1)
            .return_once(move |_, _, _| Ok(created));

        assert!(
            service(conversations, users, MockRealtimePublisher::new())
                .start_conversation(&caller, &other)
                .await
                .is_ok()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn cannot_message_yourself() {
        let caller = session_caller(Role::Developer);
        let me = caller.user_id().clone();
        let err = service(
            MockConversationRepository::new(),
            MockUserRepository::new(),
            MockRealtimePublisher::new(),
        )
        .start_conversation(&caller, &me)
        .await
        .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn typing_publishes_signal() {
        let caller = session_caller(Role::Developer);
        let conversation = conversation_with(&[caller.user_id(), &UserId::random()]);
        let mut conversations = MockConversationRepository::new();
        conversations
            .expect_find()
            .return_once(move |_| Ok(Some(conversation)));
        let mut publisher = MockRealtimePublisher::new();
        publisher
            .expect_publish()
            .withf(|event| event.name == TYPING_EVENT)
            .times(1)
            .return_once(|_| Ok(()));

        service(conversations, MockUserRepository::new(), publisher)
            .typing(&caller, &ConversationId::random())
            .await
            .expect("published");
    }
}
