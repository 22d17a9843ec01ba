//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework
//! concerns belong.

#![expect(
    dead_code,
    reason = "Schema mirrors are only read by utoipa during OpenAPI generation"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the current state of a resource.
    #[schema(rename = "conflict")]
    Conflict,
    /// A dependency is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Something went wrong")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details; validation failures carry `field` and `code`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role, rename_all = "snake_case")]
pub enum RoleSchema {
    Founder,
    Developer,
    Investor,
    Admin,
}

/// OpenAPI schema for [`crate::domain::Permission`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Permission, rename_all = "snake_case")]
pub enum PermissionSchema {
    Read,
    Write,
    Admin,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
pub struct UserSchema {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Display name shown to other users.
    #[schema(example = "Ada Lovelace")]
    display_name: String,
    /// Normalised (lowercase) email address.
    #[schema(example = "ada@example.com")]
    email: String,
    role: RoleSchema,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ProfileView`].
///
/// `contactEmail` is present only for the owner and administrators;
/// `investmentFocus` only for the owner, administrators, and founders.
#[derive(ToSchema)]
#[schema(as = crate::domain::ProfileView, rename_all = "camelCase")]
pub struct ProfileViewSchema {
    user_id: String,
    display_name: String,
    role: RoleSchema,
    headline: Option<String>,
    bio: Option<String>,
    skills: Vec<String>,
    location: Option<String>,
    website: Option<String>,
    contact_email: Option<String>,
    investment_focus: Option<String>,
    updated_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::StartupStage`].
#[derive(ToSchema)]
#[schema(as = crate::domain::StartupStage, rename_all = "snake_case")]
pub enum StartupStageSchema {
    Idea,
    Prototype,
    PreSeed,
    Seed,
    SeriesA,
    Growth,
}

/// OpenAPI schema for [`crate::domain::Startup`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Startup, rename_all = "camelCase")]
pub struct StartupSchema {
    id: String,
    owner_id: String,
    #[schema(example = "Acme Robotics")]
    name: String,
    tagline: Option<String>,
    stage: StartupStageSchema,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::StartupMember`].
#[derive(ToSchema)]
#[schema(as = crate::domain::StartupMember, rename_all = "camelCase")]
pub struct StartupMemberSchema {
    user_id: String,
    display_name: String,
    role: RoleSchema,
    joined_at: String,
}

/// OpenAPI schema for [`crate::domain::InviteStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::InviteStatus, rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteStatusSchema {
    Pending,
    Accepted,
    Revoked,
}

/// OpenAPI schema for [`crate::domain::TeamInvite`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TeamInvite, rename_all = "camelCase")]
pub struct TeamInviteSchema {
    id: String,
    startup_id: String,
    inviter_id: String,
    email: String,
    status: InviteStatusSchema,
    expires_at: String,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::IssuedInvite`].
#[derive(ToSchema)]
#[schema(as = crate::domain::IssuedInvite)]
pub struct IssuedInviteSchema {
    invite: TeamInviteSchema,
    /// One-time invite token; it is not retrievable later.
    token: String,
}

/// OpenAPI schema for [`crate::domain::Currency`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Currency, rename_all = "UPPERCASE")]
pub enum CurrencySchema {
    Usd,
    Eur,
    Gbp,
}

/// OpenAPI schema for [`crate::domain::TransactionStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TransactionStatus, rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatusSchema {
    Pending,
    Completed,
    Failed,
}

/// OpenAPI schema for [`crate::domain::Transaction`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Transaction, rename_all = "camelCase")]
pub struct TransactionSchema {
    id: String,
    idempotency_key: String,
    sender_id: String,
    recipient_id: String,
    /// Amount in minor units.
    #[schema(example = 2500)]
    amount_cents: i64,
    /// Flat service fee in minor units.
    #[schema(example = 100)]
    fee_cents: i64,
    currency: CurrencySchema,
    description: Option<String>,
    status: TransactionStatusSchema,
    created_at: String,
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::ApiKeySummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ApiKeySummary, rename_all = "camelCase")]
pub struct ApiKeySummarySchema {
    id: String,
    name: String,
    #[schema(example = "a1b2c3d4")]
    prefix: String,
    permission: PermissionSchema,
    expires_at: Option<String>,
    revoked_at: Option<String>,
    last_used_at: Option<String>,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::CreatedApiKey`].
///
/// The summary fields are flattened next to the one-time `token`.
#[derive(ToSchema)]
#[schema(as = crate::domain::CreatedApiKey, rename_all = "camelCase")]
pub struct CreatedApiKeySchema {
    #[serde(flatten)]
    summary: ApiKeySummarySchema,
    /// Plaintext key, shown only in this response.
    #[schema(example = "dfds_a1b2c3d4_0123456789abcdefghijklmnopqrstuv")]
    token: String,
}

/// OpenAPI schema for [`crate::domain::Participant`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Participant, rename_all = "camelCase")]
pub struct ParticipantSchema {
    user_id: String,
    display_name: String,
}

/// OpenAPI schema for [`crate::domain::Conversation`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Conversation, rename_all = "camelCase")]
pub struct ConversationSchema {
    id: String,
    participants: Vec<ParticipantSchema>,
    created_at: String,
    last_message_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Message`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Message, rename_all = "camelCase")]
pub struct MessageSchema {
    id: String,
    conversation_id: String,
    sender_id: String,
    body: String,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::FeatureStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FeatureStatus, rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureStatusSchema {
    Planned,
    InProgress,
    Done,
}

/// OpenAPI schema for [`crate::domain::FeatureRequest`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FeatureRequest, rename_all = "camelCase")]
pub struct FeatureRequestSchema {
    id: String,
    author_id: String,
    author_name: String,
    title: String,
    description: String,
    status: FeatureStatusSchema,
    vote_count: i64,
    /// Whether the requesting user has voted for this feature.
    voted_by_viewer: bool,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::BlogPost`].
#[derive(ToSchema)]
#[schema(as = crate::domain::BlogPost, rename_all = "camelCase")]
pub struct BlogPostSchema {
    id: String,
    author_id: String,
    author_name: String,
    #[schema(example = "launch-day")]
    slug: String,
    title: String,
    body: String,
    /// Absent while the post is a draft.
    published_at: Option<String>,
    created_at: String,
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::Thread`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Thread, rename_all = "camelCase")]
pub struct ThreadSchema {
    id: String,
    author_id: String,
    author_name: String,
    title: String,
    body: String,
    reply_count: i64,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Reply`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Reply, rename_all = "camelCase")]
pub struct ReplySchema {
    id: String,
    thread_id: String,
    author_id: String,
    author_name: String,
    body: String,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ThreadDetail`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ThreadDetail)]
pub struct ThreadDetailSchema {
    #[serde(flatten)]
    thread: ThreadSchema,
    replies: Vec<ReplySchema>,
}

/// OpenAPI schema for [`crate::domain::ChatRole`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ChatRole, rename_all = "lowercase")]
pub enum ChatRoleSchema {
    /// Only ever sent upstream; rejected in client transcripts.
    System,
    User,
    Assistant,
}

/// OpenAPI schema for [`crate::domain::ChatMessage`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ChatMessage)]
pub struct ChatMessageSchema {
    role: ChatRoleSchema,
    content: String,
}

/// OpenAPI schema for [`crate::domain::HolderDilution`].
#[derive(ToSchema)]
#[schema(as = crate::domain::HolderDilution, rename_all = "camelCase")]
pub struct HolderDilutionSchema {
    name: String,
    before_bps: u32,
    after_bps: u32,
    dilution_bps: u32,
}

/// OpenAPI schema for [`crate::domain::ShareTerms`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ShareTerms, rename_all = "camelCase")]
pub struct ShareTermsSchema {
    /// Price per share in thousandths of a minor unit.
    price_per_share_millicents: u64,
    new_shares: u64,
    post_money_shares: u64,
}

/// OpenAPI schema for [`crate::domain::RoundOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RoundOutcome, rename_all = "camelCase")]
pub struct RoundOutcomeSchema {
    pre_money_cents: u64,
    investment_cents: u64,
    post_money_cents: u64,
    #[schema(example = 2000)]
    investor_ownership_bps: u32,
    holders: Vec<HolderDilutionSchema>,
    shares: Option<ShareTermsSchema>,
}

/// Declare the OpenAPI schema of one page of `$item`.
macro_rules! page_schema {
    ($name:ident, $item:ty, $alias:ident) => {
        #[doc = concat!("One page of `", stringify!($alias), "` items with the full listing size.")]
        #[derive(ToSchema)]
        #[schema(as = $alias)]
        pub struct $name {
            items: Vec<$item>,
            limit: u32,
            offset: u32,
            total: u64,
        }
    };
}

page_schema!(UserPageSchema, UserSchema, UserPage);
page_schema!(ProfilePageSchema, ProfileViewSchema, ProfilePage);
page_schema!(TransactionPageSchema, TransactionSchema, TransactionPage);
page_schema!(ConversationPageSchema, ConversationSchema, ConversationPage);
page_schema!(MessagePageSchema, MessageSchema, MessagePage);
page_schema!(FeatureRequestPageSchema, FeatureRequestSchema, FeatureRequestPage);
page_schema!(BlogPostPageSchema, BlogPostSchema, BlogPostPage);
page_schema!(ThreadPageSchema, ThreadSchema, ThreadPage);
