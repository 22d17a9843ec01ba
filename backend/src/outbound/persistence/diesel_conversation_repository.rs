//! PostgreSQL-backed `ConversationRepository` implementation using Diesel ORM.
//!
//! Conversations are stored as a header row plus one participant row per
//! member. Participant display names are loaded in a single follow-up query
//! for every page of conversations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ConversationRepository, ConversationRepositoryError};
use crate::domain::{
    Conversation, ConversationId, Message, MessageId, Page, PageRequest, Participant, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MessageRow, NewMessageRow};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::{conversation_participants, conversations, messages, users};

type HeaderRow = (Uuid, DateTime<Utc>, Option<DateTime<Utc>>);

#[derive(QueryableByName)]
struct DirectMatch {
    #[diesel(sql_type = sql_types::Uuid)]
    id: Uuid,
}

const FIND_DIRECT_SQL: &str = "\
SELECT c.id FROM conversations c \
WHERE (SELECT COUNT(*) FROM conversation_participants p WHERE p.conversation_id = c.id) = 2 \
  AND EXISTS (SELECT 1 FROM conversation_participants p WHERE p.conversation_id = c.id AND p.user_id = $1) \
  AND EXISTS (SELECT 1 FROM conversation_participants p WHERE p.conversation_id = c.id AND p.user_id = $2) \
ORDER BY c.created_at \
LIMIT 1";

/// Diesel-backed implementation of the conversation repository port.
#[derive(Clone)]
pub struct DieselConversationRepository {
    pool: DbPool,
}

impl DieselConversationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ConversationRepositoryError {
    map_basic_pool_error(error, ConversationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ConversationRepositoryError {
    map_basic_diesel_error(
        error,
        ConversationRepositoryError::query,
        ConversationRepositoryError::connection,
    )
}

fn row_to_message(row: MessageRow) -> Message {
    Message {
        id: MessageId::from_uuid(row.id),
        conversation_id: ConversationId::from_uuid(row.conversation_id),
        sender_id: UserId::from_uuid(row.sender_id),
        body: row.body,
        created_at: row.created_at,
    }
}

/// Attach participants to headers, preserving header order.
fn assemble(
    headers: Vec<HeaderRow>,
    members: Vec<(Uuid, Uuid, String)>,
) -> Result<Vec<Conversation>, ConversationRepositoryError> {
    let mut by_conversation: HashMap<Uuid, Vec<Participant>> = HashMap::new();
    for (conversation_id, user_id, display_name) in members {
        let display_name =
            row_decoding::display_name(display_name).map_err(ConversationRepositoryError::query)?;
        by_conversation
            .entry(conversation_id)
            .or_default()
            .push(Participant {
                user_id: UserId::from_uuid(user_id),
                display_name,
            });
    }
    Ok(headers
        .into_iter()
        .map(|(id, created_at, last_message_at)| Conversation {
            id: ConversationId::from_uuid(id),
            participants: by_conversation.remove(&id).unwrap_or_default(),
            created_at,
            last_message_at,
        })
        .collect())
}

async fn load_conversations(
    conn: &mut AsyncPgConnection,
    headers: Vec<HeaderRow>,
) -> Result<Vec<Conversation>, ConversationRepositoryError> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = headers.iter().map(|(id, _, _)| *id).collect();
    let members: Vec<(Uuid, Uuid, String)> = conversation_participants::table
        .inner_join(users::table)
        .filter(conversation_participants::conversation_id.eq_any(ids))
        .select((
            conversation_participants::conversation_id,
            users::id,
            users::display_name,
        ))
        .order((users::display_name.asc(), users::id.asc()))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    assemble(headers, members)
}

async fn load_one(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<Conversation>, ConversationRepositoryError> {
    let header: Option<HeaderRow> = conversations::table
        .find(id)
        .select((
            conversations::id,
            conversations::created_at,
            conversations::last_message_at,
        ))
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    let Some(header) = header else {
        return Ok(None);
    };
    Ok(load_conversations(conn, vec![header]).await?.pop())
}

#[async_trait]
impl ConversationRepository for DieselConversationRepository {
    async fn find_direct(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let found: Option<DirectMatch> = diesel::sql_query(FIND_DIRECT_SQL)
            .bind::<sql_types::Uuid, _>(*a.as_uuid())
            .bind::<sql_types::Uuid, _>(*b.as_uuid())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match found {
            Some(DirectMatch { id }) => load_one(&mut conn, id).await,
            None => Ok(None),
        }
    }

    async fn create(
        &self,
        id: &ConversationId,
        participants: &[UserId],
        at: DateTime<Utc>,
    ) -> Result<Conversation, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conversation_id = *id.as_uuid();
        let members: Vec<_> = participants
            .iter()
            .map(|user| {
                (
                    conversation_participants::conversation_id.eq(conversation_id),
                    conversation_participants::user_id.eq(*user.as_uuid()),
                )
            })
            .collect();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(conversations::table)
                    .values((
                        conversations::id.eq(conversation_id),
                        conversations::created_at.eq(at),
                    ))
                    .execute(conn)
                    .await?;
                diesel::insert_into(conversation_participants::table)
                    .values(&members)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?;

        load_one(&mut conn, conversation_id)
            .await?
            .ok_or_else(|| ConversationRepositoryError::query("created conversation vanished"))
    }

    async fn find(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_one(&mut conn, *id.as_uuid()).await
    }

    async fn list_for_user(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<Conversation>, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = row_decoding::limit_offset(page);
        let member_of = conversation_participants::user_id.eq(*user.as_uuid());

        let total: i64 = conversations::table
            .inner_join(conversation_participants::table)
            .filter(member_of.clone())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let headers: Vec<HeaderRow> = conversations::table
            .inner_join(conversation_participants::table)
            .filter(member_of)
            .select((
                conversations::id,
                conversations::created_at,
                conversations::last_message_at,
            ))
            .order((
                conversations::last_message_at.desc().nulls_last(),
                conversations::created_at.desc(),
            ))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = load_conversations(&mut conn, headers).await?;
        Ok(Page::new(items, page, row_decoding::total(total)))
    }

    async fn insert_message(&self, message: &Message) -> Result<(), ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conversation_id = *message.conversation_id.as_uuid();
        let row = NewMessageRow {
            id: *message.id.as_uuid(),
            conversation_id,
            sender_id: *message.sender_id.as_uuid(),
            body: &message.body,
            created_at: message.created_at,
        };

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(messages::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::update(conversations::table.find(conversation_id))
                    .set(conversations::last_message_at.eq(Some(row.created_at)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_messages(
        &self,
        id: &ConversationId,
        page: PageRequest,
    ) -> Result<Page<Message>, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = row_decoding::limit_offset(page);
        let in_conversation = messages::conversation_id.eq(*id.as_uuid());

        let total: i64 = messages::table
            .filter(in_conversation.clone())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<MessageRow> = messages::table
            .filter(in_conversation)
            .select(MessageRow::as_select())
            .order((messages::created_at.desc(), messages::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows.into_iter().map(row_to_message).collect();
        Ok(Page::new(items, page, row_decoding::total(total)))
    }
}
