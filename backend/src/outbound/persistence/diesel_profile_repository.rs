//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.
//!
//! Profiles are optional: every read starts from `users` and left joins
//! `profiles`, so a member who never saved a profile still appears in the
//! directory with empty fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{IntoBoxed, LeftJoin, sql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{Page, PageRequest, Profile, ProfileFilter, ProfileUpdate, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ProfileRow, ProfileWrite};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::{profiles, users};

type DirectoryRow = (Uuid, String, String, Option<ProfileRow>);
type DirectoryQuery<'a> = IntoBoxed<'a, LeftJoin<users::table, profiles::table>, Pg>;

/// Diesel-backed implementation of the profile repository port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    map_basic_pool_error(error, ProfileRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProfileRepositoryError {
    map_basic_diesel_error(
        error,
        ProfileRepositoryError::query,
        ProfileRepositoryError::connection,
    )
}

/// Escape `LIKE` wildcards so user input matches literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn directory_query(filter: &ProfileFilter) -> DirectoryQuery<'static> {
    let mut query = users::table.left_join(profiles::table).into_boxed();
    if let Some(role) = filter.role {
        query = query.filter(users::role.eq(role.as_str()));
    }
    if let Some(skill) = &filter.skill {
        query = query.filter(
            sql::<Bool>("EXISTS (SELECT 1 FROM unnest(profiles.skills) AS skill WHERE lower(skill) = lower(")
                .bind::<Text, _>(skill.clone())
                .sql("))"),
        );
    }
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        query = query.filter(
            users::display_name
                .ilike(pattern.clone())
                .or(profiles::headline.ilike(pattern)),
        );
    }
    query
}

fn row_to_profile(row: DirectoryRow) -> Result<Profile, ProfileRepositoryError> {
    let (user_id, display_name, role, profile) = row;
    let display_name =
        row_decoding::display_name(display_name).map_err(ProfileRepositoryError::query)?;
    let role = row_decoding::role(&role).map_err(ProfileRepositoryError::query)?;
    let mut result = Profile {
        user_id: UserId::from_uuid(user_id),
        display_name,
        role,
        headline: None,
        bio: None,
        skills: Vec::new(),
        location: None,
        website: None,
        contact_email: None,
        investment_focus: None,
        updated_at: None,
    };
    let Some(stored) = profile else {
        return Ok(result);
    };
    result.contact_email = stored
        .contact_email
        .as_deref()
        .map(row_decoding::email)
        .transpose()
        .map_err(ProfileRepositoryError::query)?;
    result.headline = stored.headline;
    result.bio = stored.bio;
    result.skills = stored.skills;
    result.location = stored.location;
    result.website = stored.website;
    result.investment_focus = stored.investment_focus;
    result.updated_at = Some(stored.updated_at);
    Ok(result)
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn upsert(
        &self,
        user: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let write = ProfileWrite {
            user_id: *user.as_uuid(),
            headline: update.headline.as_deref(),
            bio: update.bio.as_deref(),
            skills: &update.skills,
            location: update.location.as_deref(),
            website: update.website.as_deref(),
            contact_email: update.contact_email.as_ref().map(AsRef::as_ref),
            investment_focus: update.investment_focus.as_deref(),
            updated_at: at,
        };
        diesel::insert_into(profiles::table)
            .values(&write)
            .on_conflict(profiles::user_id)
            .do_update()
            .set(&write)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, user: &UserId) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DirectoryRow> = users::table
            .left_join(profiles::table)
            .filter(users::id.eq(*user.as_uuid()))
            .select((
                users::id,
                users::display_name,
                users::role,
                Option::<ProfileRow>::as_select(),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_profile).transpose()
    }

    async fn search(
        &self,
        filter: &ProfileFilter,
        page: PageRequest,
    ) -> Result<Page<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = row_decoding::limit_offset(page);

        let total: i64 = directory_query(filter)
            .select(diesel::dsl::count_star())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<DirectoryRow> = directory_query(filter)
            .select((
                users::id,
                users::display_name,
                users::role,
                Option::<ProfileRow>::as_select(),
            ))
            .order((users::display_name.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_profile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, row_decoding::total(total)))
    }
}
