//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`RealtimePublisher`], [`ChatCompletion`])
//! are implemented by outbound adapters. Driving ports (`*Command`,
//! `*Query`, [`LoginService`], and friends) are implemented by the domain
//! services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod api_key_repository;
mod api_key_service;
mod assistant_service;
mod blog_repository;
mod blog_service;
mod chat_completion;
mod conversation_repository;
mod forum_repository;
mod forum_service;
mod login_service;
mod messaging_service;
mod payment_service;
mod profile_repository;
mod profile_service;
mod realtime_publisher;
mod registration_service;
mod roadmap_repository;
mod roadmap_service;
mod startup_repository;
mod startup_service;
mod transaction_repository;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use api_key_repository::MockApiKeyRepository;
pub use api_key_repository::{ApiKeyRepository, ApiKeyRepositoryError};
#[cfg(test)]
pub use api_key_service::{MockApiKeyAuthenticator, MockApiKeyCommand};
pub use api_key_service::{ApiKeyAuthenticator, ApiKeyCommand};
pub use assistant_service::AssistantChat;
#[cfg(test)]
pub use assistant_service::MockAssistantChat;
#[cfg(test)]
pub use blog_repository::MockBlogRepository;
pub use blog_repository::{BlogRepository, BlogRepositoryError};
#[cfg(test)]
pub use blog_service::{MockBlogCommand, MockBlogQuery};
pub use blog_service::{BlogCommand, BlogQuery};
#[cfg(test)]
pub use chat_completion::MockChatCompletion;
pub use chat_completion::{ChatCompletion, ChatCompletionError, UnconfiguredChatCompletion};
#[cfg(test)]
pub use conversation_repository::MockConversationRepository;
pub use conversation_repository::{ConversationRepository, ConversationRepositoryError};
#[cfg(test)]
pub use forum_repository::MockForumRepository;
pub use forum_repository::{ForumRepository, ForumRepositoryError};
#[cfg(test)]
pub use forum_service::{MockForumCommand, MockForumQuery};
pub use forum_service::{ForumCommand, ForumQuery};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use messaging_service::{MockMessagingCommand, MockMessagingQuery};
pub use messaging_service::{MessagingCommand, MessagingQuery};
#[cfg(test)]
pub use payment_service::{MockPaymentCommand, MockPaymentQuery};
pub use payment_service::{PaymentCommand, PaymentQuery};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use profile_service::{MockProfileCommand, MockProfileQuery};
pub use profile_service::{ProfileCommand, ProfileQuery};
#[cfg(test)]
pub use realtime_publisher::MockRealtimePublisher;
pub use realtime_publisher::{NoOpRealtimePublisher, RealtimePublishError, RealtimePublisher};
#[cfg(test)]
pub use registration_service::MockRegistrationService;
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use roadmap_repository::MockRoadmapRepository;
pub use roadmap_repository::{RoadmapRepository, RoadmapRepositoryError};
#[cfg(test)]
pub use roadmap_service::{MockRoadmapCommand, MockRoadmapQuery};
pub use roadmap_service::{RoadmapCommand, RoadmapQuery};
#[cfg(test)]
pub use startup_repository::MockStartupRepository;
pub use startup_repository::{StartupRepository, StartupRepositoryError};
#[cfg(test)]
pub use startup_service::{MockStartupCommand, MockStartupQuery};
pub use startup_service::{StartupCommand, StartupQuery};
#[cfg(test)]
pub use transaction_repository::MockTransactionRepository;
pub use transaction_repository::{TransactionRepository, TransactionRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
