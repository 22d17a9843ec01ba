//! API key domain service.
//!
//! Verification hashes the presented token and compares it against every row
//! sharing its prefix before looking at revocation or expiry, so the work done
//! does not depend on which candidate matched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;

use crate::domain::ports::{
    ApiKeyAuthenticator, ApiKeyCommand, ApiKeyRepository, ApiKeyRepositoryError,
};
use crate::domain::{
    ApiKeyId, ApiKeyPrincipal, ApiKeyRecord, ApiKeySummary, ApiKeyToken, Caller, CreatedApiKey,
    Error, NewApiKey, Permission, find_matching_key,
};

const INVALID_KEY: &str = "invalid api key";

/// API key service implementing authentication and owner management.
#[derive(Clone)]
pub struct ApiKeyService<R> {
    keys: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ApiKeyService<R> {
    pub fn new(keys: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { keys, clock }
    }
}

impl<R> ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    fn map_repository_error(error: ApiKeyRepositoryError) -> Error {
        match error {
            ApiKeyRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("api key repository unavailable: {message}"))
            }
            ApiKeyRepositoryError::Query { message } => {
                Error::internal(format!("api key repository error: {message}"))
            }
        }
    }

    fn require_session(caller: &Caller) -> Result<(), Error> {
        if caller.is_session() {
            Ok(())
        } else {
            Err(Error::forbidden("api keys can only be managed from a session"))
        }
    }
}

#[async_trait]
impl<R> ApiKeyAuthenticator for ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    async fn authenticate(&self, presented: &str) -> Result<ApiKeyPrincipal, Error> {
        let token =
            ApiKeyToken::parse(presented).map_err(|_| Error::unauthorized(INVALID_KEY))?;
        let candidates = self
            .keys
            .find_by_prefix(token.prefix())
            .await
            .map_err(Self::map_repository_error)?;

        let Some(record) = find_matching_key(&token.hash(), &candidates) else {
            return Err(Error::unauthorized(INVALID_KEY));
        };
        let now = self.clock.utc();
        if record.is_revoked() || record.is_expired(now) {
            tracing::debug!(key_id = %record.id, "rejected inactive api key");
            return Err(Error::unauthorized(INVALID_KEY));
        }

        if let Err(error) = self.keys.touch_last_used(&record.id, now).await {
            tracing::warn!(key_id = %record.id, %error, "failed to record api key use");
        }

        Ok(ApiKeyPrincipal {
            key_id: record.id,
            owner_id: record.owner_id.clone(),
            owner_role: record.owner_role,
            permission: record.permission,
        })
    }
}

#[async_trait]
impl<R> ApiKeyCommand for ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    async fn create(&self, caller: &Caller, request: &NewApiKey) -> Result<CreatedApiKey, Error> {
        Self::require_session(caller)?;
        if request.permission() == Permission::Admin && !caller.is_admin() {
            return Err(Error::forbidden("only administrators may mint admin keys"));
        }

        let now = self.clock.utc();
        let token = ApiKeyToken::generate();
        let record = ApiKeyRecord {
            id: ApiKeyId::random(),
            owner_id: caller.user_id().clone(),
            owner_role: caller.role(),
            name: request.name().to_owned(),
            prefix: token.prefix().clone(),
            key_hash: token.hash(),
            permission: request.permission(),
            expires_at: request
                .expires_in_days()
                .map(|days| now + Duration::days(i64::from(days))),
            revoked_at: None,
            last_used_at: None,
            created_at: now,
        };
        self.keys
            .insert(&record)
            .await
            .map_err(Self::map_repository_error)?;
        tracing::info!(key_id = %record.id, permission = %record.permission, "api key created");

        Ok(CreatedApiKey {
            summary: record.summary(),
            token: token.expose().to_owned(),
        })
    }

    async fn list(&self, caller: &Caller) -> Result<Vec<ApiKeySummary>, Error> {
        Self::require_session(caller)?;
        let records = self
            .keys
            .list_for_owner(caller.user_id())
            .await
            .map_err(Self::map_repository_error)?;
        Ok(records.iter().map(ApiKeyRecord::summary).collect())
    }

    async fn revoke(&self, caller: &Caller, id: &ApiKeyId) -> Result<ApiKeySummary, Error> {
        Self::require_session(caller)?;
        self.keys
            .revoke(caller.user_id(), id, self.clock.utc())
            .await
            .map_err(Self::map_repository_error)?
            .map(|record| record.summary())
            .ok_or_else(|| Error::not_found("api key not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockApiKeyRepository;
    use crate::domain::{ErrorCode, Role, UserId};
    use crate::test_support::{fixture_clock, fixture_timestamp, session_caller};
    use rstest::rstest;

    fn service(repo: MockApiKeyRepository) -> ApiKeyService<MockApiKeyRepository> {
        ApiKeyService::new(Arc::new(repo), fixture_clock())
    }

    fn record_for(token: &ApiKeyToken, permission: Permission) -> ApiKeyRecord {
        ApiKeyRecord {
            id: ApiKeyId::random(),
            owner_id: UserId::random(),
            owner_role: Role::Developer,
            name: "ci".to_owned(),
            prefix: token.prefix().clone(),
            key_hash: token.hash(),
            permission,
            expires_at: None,
            revoked_at: None,
            last_used_at: None,
            created_at: fixture_timestamp(),
        }
    }

    fn decoy_with_prefix(token: &ApiKeyToken) -> ApiKeyRecord {
        let other = ApiKeyToken::generate();
        ApiKeyRecord {
            prefix: token.prefix().clone(),
            ..record_for(&other, Permission::Admin)
        }
    }

    #[rstest]
    #[tokio::test]
    async fn authenticates_matching_key_and_records_use() {
        let token = ApiKeyToken::generate();
        let record = record_for(&token, Permission::Write);
        let expected_id = record.id;
        let candidates = vec![decoy_with_prefix(&token), record.clone()];
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_by_prefix()
            .withf({
                let prefix = token.prefix().clone();
                move |candidate| *candidate == prefix
            })
            .return_once(move |_| Ok(candidates));
        repo.expect_touch_last_used()
            .withf(move |id, at| *id == expected_id && *at == fixture_timestamp())
            .times(1)
            .return_once(|_, _| Ok(()));

        let principal = service(repo)
            .authenticate(token.expose())
            .await
            .expect("authenticated");
        assert_eq!(principal.key_id, expected_id);
        assert_eq!(principal.permission, Permission::Write);
        assert_eq!(principal.owner_id, record.owner_id);
    }

    #[rstest]
    #[case::revoked(Some(fixture_timestamp()), None)]
    #[case::expired_now(None, Some(fixture_timestamp()))]
    #[tokio::test]
    async fn rejects_inactive_keys(
        #[case] revoked_at: Option<chrono::DateTime<chrono::Utc>>,
        #[case] expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) {
        let token = ApiKeyToken::generate();
        let record = ApiKeyRecord {
            revoked_at,
            expires_at,
            ..record_for(&token, Permission::Read)
        };
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_by_prefix()
            .return_once(move |_| Ok(vec![record]));
        repo.expect_touch_last_used().times(0);

        let err = service(repo)
            .authenticate(token.expose())
            .await
            .expect_err("inactive");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case("not-a-token")]
    #[case("dfds_ab12cd34_short")]
    #[tokio::test]
    async fn malformed_tokens_never_reach_the_repository(#[case] presented: &str) {
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_by_prefix().times(0);
        let err = service(repo)
            .authenticate(presented)
            .await
            .expect_err("malformed");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_secret_with_known_prefix_is_rejected() {
        let token = ApiKeyToken::generate();
        let decoy = decoy_with_prefix(&token);
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_by_prefix()
            .return_once(move |_| Ok(vec![decoy]));
        let err = service(repo)
            .authenticate(token.expose())
            .await
            .expect_err("no match");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_usage_update_does_not_fail_authentication() {
        let token = ApiKeyToken::generate();
        let record = record_for(&token, Permission::Read);
        let mut repo = MockApiKeyRepository::new();
        repo.expect_find_by_prefix()
            .return_once(move |_| Ok(vec![record]));
        repo.expect_touch_last_used()
            .return_once(|_, _| Err(ApiKeyRepositoryError::query("deadlock")));

        assert!(service(repo).authenticate(token.expose()).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn create_stores_hash_and_reveals_token_once() {
        let caller = session_caller(Role::Developer);
        let owner = caller.user_id().clone();
        let mut repo = MockApiKeyRepository::new();
        repo.expect_insert()
            .withf(move |record| {
                record.owner_id == owner
                    && record.permission == Permission::Write
                    && record.expires_at == Some(fixture_timestamp() + Duration::days(30))
            })
            .times(1)
            .return_once(|_| Ok(()));
        let request = NewApiKey::try_new("deploy bot", Permission::Write, Some(30)).expect("valid");

        let created = service(repo)
            .create(&caller, &request)
            .await
            .expect("created");
        let token = ApiKeyToken::parse(&created.token).expect("well-formed token");
        assert_eq!(created.summary.prefix, token.prefix().to_string());
        assert_eq!(created.summary.name, "deploy bot");
    }

    #[rstest]
    #[tokio::test]
    async fn non_admins_cannot_mint_admin_keys() {
        let mut repo = MockApiKeyRepository::new();
        repo.expect_insert().times(0);
        let request = NewApiKey::try_new("root", Permission::Admin, None).expect("valid");
        let err = service(repo)
            .create(&session_caller(Role::Founder), &request)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn api_key_callers_cannot_manage_keys() {
        let caller = Caller::from_api_key(ApiKeyPrincipal {
            key_id: ApiKeyId::random(),
            owner_id: UserId::random(),
            owner_role: Role::Admin,
            permission: Permission::Admin,
        });
        let mut repo = MockApiKeyRepository::new();
        repo.expect_list_for_owner().times(0);
        let err = service(repo).list(&caller).await.expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn revoking_someone_elses_key_is_not_found() {
        let mut repo = MockApiKeyRepository::new();
        repo.expect_revoke().return_once(|_, _, _| Ok(None));
        let err = service(repo)
            .revoke(&session_caller(Role::Developer), &ApiKeyId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
