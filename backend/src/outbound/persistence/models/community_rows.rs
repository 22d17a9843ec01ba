//! Rows for messaging, roadmap, blog and thread tables.
//!
//! Aggregated reads (vote and reply counts) come back from raw SQL and use
//! `QueryableByName`; the rest are plain table rows.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Text, Timestamptz};
use uuid::Uuid;

use crate::outbound::persistence::schema::{
    blog_posts, feature_requests, messages, thread_replies, threads,
};

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Roadmap
// ---------------------------------------------------------------------------

/// Feature request with its vote tally as seen by one viewer.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct FeatureRow {
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: Uuid,
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub author_id: Uuid,
    #[diesel(sql_type = Text)]
    pub author_name: String,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub description: String,
    #[diesel(sql_type = Text)]
    pub status: String,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = BigInt)]
    pub vote_count: i64,
    #[diesel(sql_type = Bool)]
    pub voted_by_viewer: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = feature_requests)]
pub(crate) struct NewFeatureRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

/// Post joined with its author's display name.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct BlogPostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blog_posts)]
pub(crate) struct NewBlogPostRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub slug: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

/// Thread with its author's display name and reply count.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct ThreadRow {
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: Uuid,
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub author_id: Uuid,
    #[diesel(sql_type = Text)]
    pub author_name: String,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = BigInt)]
    pub reply_count: i64,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = threads)]
pub(crate) struct NewThreadRow<'a> {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: &'a str,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Reply joined with its author's display name.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct ReplyRow {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = thread_replies)]
pub(crate) struct NewReplyRow<'a> {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub author_id: Uuid,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}
