//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services that implement the driving ports.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - Caller (alias to `caller::Caller`): authenticated principal of a request.
//! - `*Service` types: implementations of the driving ports in [`ports`].

pub mod api_key;
pub mod assistant;
pub mod auth;
pub mod blog;
pub mod caller;
pub mod equity;
pub mod error;
pub mod forum;
pub mod idempotency;
mod ids;
pub mod messaging;
pub mod pagination;
pub mod payments;
pub mod ports;
pub mod profile;
pub mod roadmap;
pub mod sanitize;
pub mod slug;
pub mod startup;
pub mod trace_id;
pub mod user;

mod account_service;
mod api_key_service;
mod assistant_service;
mod blog_service;
mod forum_service;
mod messaging_service;
mod payment_service;
mod profile_service;
mod roadmap_service;
mod startup_service;

pub use self::account_service::AccountService;
pub use self::api_key::{
    API_KEY_EXPIRY_DAYS_MAX, API_KEY_NAME_MAX, ApiKeyId, ApiKeyPrincipal, ApiKeyRecord,
    ApiKeySummary, ApiKeyToken, ApiKeyTokenError, CreatedApiKey, KeyHash, KeyPrefix, NewApiKey,
    NewApiKeyError, Permission, UnknownPermission, find_matching_key,
};
pub use self::api_key_service::ApiKeyService;
pub use self::assistant::{
    CHAT_MESSAGE_MAX, ChatMessage, ChatRole, ChatTranscript, SYSTEM_PROMPT,
    TRANSCRIPT_MAX_MESSAGES, TranscriptError,
};
pub use self::assistant_service::AssistantChatService;
pub use self::auth::{
    AuthenticatedUser, CredentialsValidationError, LoginCredentials, PasswordHash,
    PasswordHashError, Registration,
};
pub use self::blog::{BlogPost, PostDraft, PostId, PostValidationError};
pub use self::blog_service::BlogService;
pub use self::caller::{Caller, CallerSource};
pub use self::equity::{
    EquityError, FundingRound, HolderDilution, HolderStake, RoundOutcome, ShareTerms,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::forum::{
    NewReply, NewThread, Reply, ReplyId, Thread, ThreadDetail, ThreadId, ThreadValidationError,
};
pub use self::forum_service::ForumService;
pub use self::idempotency::{IdempotencyKey, IdempotencyKeyValidationError};
pub use self::messaging::{
    Conversation, ConversationId, MESSAGE_NEW_EVENT, Message, MessageBody, MessageId,
    Participant, RealtimeEvent, TYPING_EVENT, conversation_channel,
};
pub use self::messaging_service::MessagingService;
pub use self::pagination::{Page, PageRequest, PageRequestError};
pub use self::payments::{
    Currency, FeePolicy, PaymentOutcome, PaymentRequest, PaymentValidationError,
    SettlementOutcome, Transaction, TransactionId, TransactionStatus, ValidatedPayment,
};
pub use self::payment_service::PaymentService;
pub use self::profile::{
    Profile, ProfileFilter, ProfileInput, ProfileUpdate, ProfileValidationError, ProfileView,
};
pub use self::profile_service::ProfileService;
pub use self::roadmap::{
    FeatureId, FeatureRequest, FeatureStatus, FeatureValidationError, NewFeature,
};
pub use self::roadmap_service::RoadmapService;
pub use self::sanitize::TextBoundsError;
pub use self::slug::{Slug, SlugError};
pub use self::startup::{
    InviteId, InviteStatus, InviteToken, IssuedInvite, NewStartup, Startup, StartupId,
    StartupMember, StartupStage, StartupValidationError, TeamInvite,
};
pub use self::startup_service::StartupService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{DisplayName, Email, Role, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use dfds_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
