//! Profile domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    ProfileCommand, ProfileQuery, ProfileRepository, ProfileRepositoryError,
};
use crate::domain::{
    Caller, Error, Page, PageRequest, Permission, Profile, ProfileFilter, ProfileInput,
    ProfileUpdate, ProfileView, UserId,
};

/// Profile service implementing the profile driving ports.
#[derive(Clone)]
pub struct ProfileService<P> {
    profiles: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> ProfileService<P> {
    pub fn new(profiles: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { profiles, clock }
    }
}

impl<P> ProfileService<P>
where
    P: ProfileRepository,
{
    fn map_profile_error(error: ProfileRepositoryError) -> Error {
        match error {
            ProfileRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("profile repository unavailable: {message}"))
            }
            ProfileRepositoryError::Query { message } => {
                Error::internal(format!("profile repository error: {message}"))
            }
        }
    }

    async fn load(&self, user: &UserId) -> Result<Profile, Error> {
        self.profiles
            .find(user)
            .await
            .map_err(Self::map_profile_error)?
            .ok_or_else(|| Error::not_found("profile not found"))
    }
}

#[async_trait]
impl<P> ProfileCommand for ProfileService<P>
where
    P: ProfileRepository,
{
    async fn upsert(&self, caller: &Caller, input: &ProfileInput) -> Result<ProfileView, Error> {
        caller.require(Permission::Write)?;
        let update = ProfileUpdate::try_new(input, caller.role())
            .map_err(|err| Error::invalid_field(err.field(), "invalid", err.to_string()))?;
        self.profiles
            .upsert(caller.user_id(), &update, self.clock.utc())
            .await
            .map_err(Self::map_profile_error)?;
        Ok(self.load(caller.user_id()).await?.view_for(caller))
    }
}

#[async_trait]
impl<P> ProfileQuery for ProfileService<P>
where
    P: ProfileRepository,
{
    async fn get(&self, caller: &Caller, user: &UserId) -> Result<ProfileView, Error> {
        caller.require(Permission::Read)?;
        Ok(self.load(user).await?.view_for(caller))
    }

    async fn discover(
        &self,
        caller: &Caller,
        filter: &ProfileFilter,
        page: PageRequest,
    ) -> Result<Page<ProfileView>, Error> {
        caller.require(Permission::Read)?;
        let profiles = self
            .profiles
            .search(filter, page)
            .await
            .map_err(Self::map_profile_error)?;
        Ok(profiles.map(|profile| profile.view_for(caller)))
    }
}
