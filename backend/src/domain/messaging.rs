//! Direct conversations and their real-time events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use super::ids::uuid_id;
use super::sanitize::{TextBoundsError, check_bounds, sanitize_multiline};
use super::user::{DisplayName, UserId};

/// Longest message body kept after sanitising.
pub const MESSAGE_BODY_MAX: usize = 4_000;
/// Event published when a message is stored.
pub const MESSAGE_NEW_EVENT: &str = "message:new";
/// Event published when a participant is typing.
pub const TYPING_EVENT: &str = "typing";

uuid_id!(
    /// Identifier of a conversation.
    ConversationId
);
uuid_id!(
    /// Identifier of a message.
    MessageId
);

/// Private channel that carries a conversation's events.
///
/// # Examples
/// ```
/// use dfds_backend::domain::{ConversationId, conversation_channel};
/// use uuid::Uuid;
///
/// let id = ConversationId::from_uuid(Uuid::nil());
/// assert_eq!(
///     conversation_channel(&id),
///     "private-conversation-00000000-0000-0000-0000-000000000000"
/// );
/// ```
pub fn conversation_channel(id: &ConversationId) -> String {
    format!("private-conversation-{id}")
}

/// Participant of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: UserId,
    pub display_name: DisplayName,
}

/// Conversation with its participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<Participant>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn includes(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| &p.user_id == user)
    }
}

/// Sanitised message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn try_new(raw: &str) -> Result<Self, TextBoundsError> {
        let body = sanitize_multiline(raw);
        check_bounds(&body, 1, MESSAGE_BODY_MAX)?;
        Ok(Self(body))
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MessageBody> for String {
    fn from(value: MessageBody) -> Self {
        value.0
    }
}

/// Stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Event fanned out to a conversation's channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeEvent {
    pub channel: String,
    pub name: &'static str,
    pub payload: Value,
}

impl RealtimeEvent {
    /// `message:new` carrying the stored message.
    pub fn message_new(message: &Message) -> Self {
        Self {
            channel: conversation_channel(&message.conversation_id),
            name: MESSAGE_NEW_EVENT,
            payload: json!({ "message": message }),
        }
    }

    /// `typing` for `user` in `conversation`.
    pub fn typing(conversation: &ConversationId, user: &UserId, at: DateTime<Utc>) -> Self {
        Self {
            channel: conversation_channel(conversation),
            name: TYPING_EVENT,
            payload: json!({
                "conversationId": conversation,
                "userId": user,
                "at": at,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", TextBoundsError::Empty)]
    #[case("<script>alert(1)</script>", TextBoundsError::Empty)]
    fn empty_bodies_are_rejected(#[case] raw: &str, #[case] expected: TextBoundsError) {
        assert_eq!(MessageBody::try_new(raw), Err(expected));
    }

    #[rstest]
    fn overlong_bodies_are_rejected() {
        let raw = "m".repeat(MESSAGE_BODY_MAX + 1);
        assert_eq!(
            MessageBody::try_new(&raw),
            Err(TextBoundsError::TooLong {
                max: MESSAGE_BODY_MAX
            })
        );
    }

    #[rstest]
    fn bodies_keep_line_breaks() {
        let body = MessageBody::try_new("hi<b>!</b>\nsee you").expect("valid");
        assert_eq!(body.as_ref(), "hi!\nsee you");
    }

    #[rstest]
    fn message_event_targets_private_channel() {
        let message = Message {
            id: MessageId::random(),
            conversation_id: ConversationId::random(),
            sender_id: UserId::random(),
            body: "hello".into(),
            created_at: Utc::now(),
        };
        let event = RealtimeEvent::message_new(&message);
        assert_eq!(event.name, MESSAGE_NEW_EVENT);
        assert!(event.channel.starts_with("private-conversation-"));
        assert_eq!(event.payload["message"]["body"], "hello");
    }
}
