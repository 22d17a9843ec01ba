//! Roadmap voting domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    RoadmapCommand, RoadmapQuery, RoadmapRepository, RoadmapRepositoryError,
};
use crate::domain::{
    Caller, Error, FeatureId, FeatureRequest, FeatureStatus, NewFeature, Page, PageRequest,
    Permission,
};

/// Roadmap service implementing the roadmap driving ports.
#[derive(Clone)]
pub struct RoadmapService<R> {
    features: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> RoadmapService<R> {
    pub fn new(features: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { features, clock }
    }
}

impl<R> RoadmapService<R>
where
    R: RoadmapRepository,
{
    fn map_roadmap_error(error: RoadmapRepositoryError) -> Error {
        match error {
            RoadmapRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("roadmap repository unavailable: {message}"))
            }
            RoadmapRepositoryError::Query { message } => {
                Error::internal(format!("roadmap repository error: {message}"))
            }
            RoadmapRepositoryError::DuplicateVote { .. } => {
                Error::conflict("you have already voted for this feature")
            }
        }
    }

    async fn load(&self, caller: &Caller, id: &FeatureId) -> Result<FeatureRequest, Error> {
        self.features
            .find(id, caller.user_id())
            .await
            .map_err(Self::map_roadmap_error)?
            .ok_or_else(|| Error::not_found("feature request not found"))
    }
}

#[async_trait]
impl<R> RoadmapCommand for RoadmapService<R>
where
    R: RoadmapRepository,
{
    async fn create(&self, caller: &Caller, feature: &NewFeature) -> Result<FeatureRequest, Error> {
        caller.require(Permission::Write)?;
        let id = FeatureId::random();
        self.features
            .create(&id, caller.user_id(), feature, self.clock.utc())
            .await
            .map_err(Self::map_roadmap_error)?;
        self.load(caller, &id).await
    }

    async fn vote(&self, caller: &Caller, id: &FeatureId) -> Result<FeatureRequest, Error> {
        caller.require(Permission::Write)?;
        self.load(caller, id).await?;
        self.features
            .add_vote(id, caller.user_id(), self.clock.utc())
            .await
            .map_err(Self::map_roadmap_error)?;
        self.load(caller, id).await
    }

    async fn remove_vote(&self, caller: &Caller, id: &FeatureId) -> Result<FeatureRequest, Error> {
        caller.require(Permission::Write)?;
        self.load(caller, id).await?;
        // Removing a vote that was never cast leaves the tally unchanged.
        self.features
            .remove_vote(id, caller.user_id())
            .await
            .map_err(Self::map_roadmap_error)?;
        self.load(caller, id).await
    }

    async fn set_status(
        &self,
        caller: &Caller,
        id: &FeatureId,
        status: FeatureStatus,
    ) -> Result<FeatureRequest, Error> {
        caller.require_admin()?;
        let updated = self
            .features
            .set_status(id, status)
            .await
            .map_err(Self::map_roadmap_error)?;
        if !updated {
            return Err(Error::not_found("feature request not found"));
        }
        tracing::info!(feature_id = %id, status = status.as_str(), "feature status changed");
        self.load(caller, id).await
    }
}

#[async_trait]
impl<R> RoadmapQuery for RoadmapService<R>
where
    R: RoadmapRepository,
{
    async fn list(
        &self,
        caller: &Caller,
        status: Option<FeatureStatus>,
        page: PageRequest,
    ) -> Result<Page<FeatureRequest>, Error> {
        caller.require(Permission::Read)?;
        self.features
            .list(status, caller.user_id(), page)
            .await
            .map_err(Self::map_roadmap_error)
    }
}
