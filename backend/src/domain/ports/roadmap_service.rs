//! Driving ports for the roadmap board.

use async_trait::async_trait;

use crate::domain::{
    Caller, Error, FeatureId, FeatureRequest, FeatureStatus, NewFeature, Page, PageRequest,
};

/// Roadmap mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoadmapCommand: Send + Sync {
    async fn create(&self, caller: &Caller, feature: &NewFeature) -> Result<FeatureRequest, Error>;

    /// Vote once; a repeated vote yields `409 conflict`.
    async fn vote(&self, caller: &Caller, id: &FeatureId) -> Result<FeatureRequest, Error>;

    async fn remove_vote(&self, caller: &Caller, id: &FeatureId) -> Result<FeatureRequest, Error>;

    /// Administrators only.
    async fn set_status(
        &self,
        caller: &Caller,
        id: &FeatureId,
        status: FeatureStatus,
    ) -> Result<FeatureRequest, Error>;
}

/// Roadmap reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoadmapQuery: Send + Sync {
    async fn list(
        &self,
        caller: &Caller,
        status: Option<FeatureStatus>,
        page: PageRequest,
    ) -> Result<Page<FeatureRequest>, Error>;
}
