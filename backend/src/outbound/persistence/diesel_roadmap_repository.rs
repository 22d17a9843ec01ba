//! PostgreSQL-backed `RoadmapRepository` implementation using Diesel ORM.
//!
//! Vote tallies and the viewer's own vote are aggregated in SQL; the list is
//! ranked by vote count, then newest first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RoadmapRepository, RoadmapRepositoryError};
use crate::domain::{
    FeatureId, FeatureRequest, FeatureStatus, NewFeature, Page, PageRequest, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_conflicting_diesel_error};
use super::models::{FeatureRow, NewFeatureRow};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::{feature_requests, feature_votes};

/// Shared projection; `$1` is always the viewer.
macro_rules! feature_select {
    ($tail:literal) => {
        concat!(
            "SELECT f.id, f.author_id, u.display_name AS author_name, f.title, \
             f.description, f.status, f.created_at, \
             COUNT(v.user_id) AS vote_count, \
             COALESCE(BOOL_OR(v.user_id = $1), FALSE) AS voted_by_viewer \
             FROM feature_requests f \
             JOIN users u ON u.id = f.author_id \
             LEFT JOIN feature_votes v ON v.feature_id = f.id ",
            $tail
        )
    };
}

const FIND_SQL: &str = feature_select!("WHERE f.id = $2 GROUP BY f.id, u.display_name");

const LIST_SQL: &str = feature_select!(
    "WHERE ($2::text IS NULL OR f.status = $2) \
     GROUP BY f.id, u.display_name \
     ORDER BY vote_count DESC, f.created_at DESC, f.id \
     LIMIT $3 OFFSET $4"
);

/// Diesel-backed implementation of the roadmap repository port.
#[derive(Clone)]
pub struct DieselRoadmapRepository {
    pool: DbPool,
}

impl DieselRoadmapRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RoadmapRepositoryError {
    map_basic_pool_error(error, RoadmapRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RoadmapRepositoryError {
    map_conflicting_diesel_error(
        error,
        || RoadmapRepositoryError::query("unexpected unique constraint violation"),
        RoadmapRepositoryError::query,
        RoadmapRepositoryError::connection,
    )
}

fn row_to_feature(row: FeatureRow) -> Result<FeatureRequest, RoadmapRepositoryError> {
    let status = row_decoding::parse_column::<FeatureStatus>("feature status", &row.status)
        .map_err(RoadmapRepositoryError::query)?;
    let author_name =
        row_decoding::display_name(row.author_name).map_err(RoadmapRepositoryError::query)?;
    Ok(FeatureRequest {
        id: FeatureId::from_uuid(row.id),
        author_id: UserId::from_uuid(row.author_id),
        author_name,
        title: row.title,
        description: row.description,
        status,
        vote_count: row.vote_count,
        voted_by_viewer: row.voted_by_viewer,
        created_at: row.created_at,
    })
}

#[async_trait]
impl RoadmapRepository for DieselRoadmapRepository {
    async fn create(
        &self,
        id: &FeatureId,
        author: &UserId,
        feature: &NewFeature,
        at: DateTime<Utc>,
    ) -> Result<(), RoadmapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewFeatureRow {
            id: *id.as_uuid(),
            author_id: *author.as_uuid(),
            title: &feature.title,
            description: &feature.description,
            status: FeatureStatus::Planned.as_str(),
            created_at: at,
        };
        diesel::insert_into(feature_requests::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        id: &FeatureId,
        viewer: &UserId,
    ) -> Result<Option<FeatureRequest>, RoadmapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<FeatureRow> = diesel::sql_query(FIND_SQL)
            .bind::<SqlUuid, _>(*viewer.as_uuid())
            .bind::<SqlUuid, _>(*id.as_uuid())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_feature).transpose()
    }

    async fn list(
        &self,
        status: Option<FeatureStatus>,
        viewer: &UserId,
        page: PageRequest,
    ) -> Result<Page<FeatureRequest>, RoadmapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = row_decoding::limit_offset(page);
        let status = status.map(FeatureStatus::as_str);

        let mut count_query = feature_requests::table.into_boxed();
        if let Some(status) = status {
            count_query = count_query.filter(feature_requests::status.eq(status));
        }
        let total: i64 = count_query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<FeatureRow> = diesel::sql_query(LIST_SQL)
            .bind::<SqlUuid, _>(*viewer.as_uuid())
            .bind::<Nullable<Text>, _>(status)
            .bind::<BigInt, _>(limit)
            .bind::<BigInt, _>(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_feature)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, row_decoding::total(total)))
    }

    async fn add_vote(
        &self,
        id: &FeatureId,
        voter: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), RoadmapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(feature_votes::table)
            .values((
                feature_votes::feature_id.eq(*id.as_uuid()),
                feature_votes::user_id.eq(*voter.as_uuid()),
                feature_votes::created_at.eq(at),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                map_conflicting_diesel_error(
                    error,
                    || RoadmapRepositoryError::duplicate_vote(id.to_string()),
                    RoadmapRepositoryError::query,
                    RoadmapRepositoryError::connection,
                )
            })
    }

    async fn remove_vote(
        &self,
        id: &FeatureId,
        voter: &UserId,
    ) -> Result<bool, RoadmapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(feature_votes::table.find((*id.as_uuid(), *voter.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn set_status(
        &self,
        id: &FeatureId,
        status: FeatureStatus,
    ) -> Result<bool, RoadmapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(feature_requests::table.find(*id.as_uuid()))
            .set(feature_requests::status.eq(status.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
