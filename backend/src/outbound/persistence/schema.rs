//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` against a migrated database when the schema changes.

diesel::table! {
    /// Registered accounts. `email` is stored lowercase and unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        display_name -> Varchar,
        /// One of `founder`, `developer`, `investor`, `admin`.
        role -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One optional profile per user.
    profiles (user_id) {
        user_id -> Uuid,
        headline -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        skills -> Array<Text>,
        location -> Nullable<Varchar>,
        website -> Nullable<Varchar>,
        contact_email -> Nullable<Varchar>,
        investment_focus -> Nullable<Varchar>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Programmatic credentials. Only the prefix and SHA-256 digest are kept.
    api_keys (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        prefix -> Varchar,
        key_hash -> Varchar,
        permission -> Varchar,
        expires_at -> Nullable<Timestamptz>,
        revoked_at -> Nullable<Timestamptz>,
        last_used_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    startups (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        tagline -> Nullable<Varchar>,
        stage -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    startup_members (startup_id, user_id) {
        startup_id -> Uuid,
        user_id -> Uuid,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Team invites. The token itself is never stored.
    team_invites (id) {
        id -> Uuid,
        startup_id -> Uuid,
        inviter_id -> Uuid,
        email -> Varchar,
        token_hash -> Varchar,
        status -> Varchar,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Payments. `idempotency_key` is unique across all senders.
    transactions (id) {
        id -> Uuid,
        idempotency_key -> Varchar,
        sender_id -> Uuid,
        recipient_id -> Uuid,
        amount_cents -> Int8,
        fee_cents -> Int8,
        currency -> Varchar,
        description -> Nullable<Varchar>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    conversations (id) {
        id -> Uuid,
        created_at -> Timestamptz,
        last_message_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    conversation_participants (conversation_id, user_id) {
        conversation_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        conversation_id -> Uuid,
        sender_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    feature_requests (id) {
        id -> Uuid,
        author_id -> Uuid,
        title -> Varchar,
        description -> Text,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    feature_votes (feature_id, user_id) {
        feature_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Articles. Drafts have no `published_at`.
    blog_posts (id) {
        id -> Uuid,
        author_id -> Uuid,
        slug -> Varchar,
        title -> Varchar,
        body -> Text,
        published_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    threads (id) {
        id -> Uuid,
        author_id -> Uuid,
        title -> Varchar,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    thread_replies (id) {
        id -> Uuid,
        thread_id -> Uuid,
        author_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(profiles -> users (user_id));
diesel::joinable!(api_keys -> users (owner_id));
diesel::joinable!(startups -> users (owner_id));
diesel::joinable!(startup_members -> startups (startup_id));
diesel::joinable!(startup_members -> users (user_id));
diesel::joinable!(team_invites -> startups (startup_id));
diesel::joinable!(conversation_participants -> conversations (conversation_id));
diesel::joinable!(conversation_participants -> users (user_id));
diesel::joinable!(messages -> conversations (conversation_id));
diesel::joinable!(feature_requests -> users (author_id));
diesel::joinable!(feature_votes -> feature_requests (feature_id));
diesel::joinable!(blog_posts -> users (author_id));
diesel::joinable!(threads -> users (author_id));
diesel::joinable!(thread_replies -> threads (thread_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    profiles,
    api_keys,
    startups,
    startup_members,
    team_invites,
    transactions,
    conversations,
    conversation_participants,
    messages,
    feature_requests,
    feature_votes,
    blog_posts,
    threads,
    thread_replies,
);
