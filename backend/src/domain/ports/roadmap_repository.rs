//! Port for feature requests and votes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{FeatureId, FeatureRequest, FeatureStatus, NewFeature, Page, PageRequest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by roadmap repository adapters.
    pub enum RoadmapRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "roadmap repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "roadmap repository query failed: {message}",
        /// The user already voted for the feature.
        DuplicateVote { message: String } => "vote already recorded: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoadmapRepository: Send + Sync {
    /// Store a new `PLANNED` request.
    async fn create(
        &self,
        id: &FeatureId,
        author: &UserId,
        feature: &NewFeature,
        at: DateTime<Utc>,
    ) -> Result<(), RoadmapRepositoryError>;

    /// One request as seen by `viewer`.
    async fn find(
        &self,
        id: &FeatureId,
        viewer: &UserId,
    ) -> Result<Option<FeatureRequest>, RoadmapRepositoryError>;

    /// Requests ordered by vote count, then newest first.
    async fn list(
        &self,
        status: Option<FeatureStatus>,
        viewer: &UserId,
        page: PageRequest,
    ) -> Result<Page<FeatureRequest>, RoadmapRepositoryError>;

    async fn add_vote(
        &self,
        id: &FeatureId,
        voter: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), RoadmapRepositoryError>;

    /// Returns `false` when there was no vote to remove.
    async fn remove_vote(
        &self,
        id: &FeatureId,
        voter: &UserId,
    ) -> Result<bool, RoadmapRepositoryError>;

    /// Returns `false` when the request does not exist.
    async fn set_status(
        &self,
        id: &FeatureId,
        status: FeatureStatus,
    ) -> Result<bool, RoadmapRepositoryError>;
}
