use async_trait::async_trait;
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::events::{EventBus, TableChange};
use crate::schema::platforms;

use super::platforms_model::{NewPlatform, NewPlatformRow, Platform, PlatformRow, PlatformType};
use super::platforms_traits::PlatformRepositoryTrait;

/// Repository for managing platform rows and their manual ordering
pub struct PlatformRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    events: EventBus,
}

impl PlatformRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, events: EventBus) -> Self {
        Self {
            pool,
            writer,
            events,
        }
    }
}

#[async_trait]
impl PlatformRepositoryTrait for PlatformRepository {
    /// Lists all platforms ordered by sort_index ascending, ties broken by id
    fn list(&self) -> Result<Vec<Platform>> {
        let mut conn = get_connection(&self.pool)?;

        platforms::table
            .order((platforms::sort_index.asc(), platforms::id.asc()))
            .load::<PlatformRow>(&mut conn)
            .map(|rows| rows.into_iter().map(Platform::from).collect())
            .map_err(Error::from)
    }

    /// Retrieves a platform by its ID
    fn get_by_id(&self, platform_id: i32) -> Result<Platform> {
        let mut conn = get_connection(&self.pool)?;

        platforms::table
            .find(platform_id)
            .first::<PlatformRow>(&mut conn)
            .map(Platform::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    Error::NotFound(format!("Platform with id {} not found", platform_id))
                }
                other => other.into(),
            })
    }

    /// Lists platforms matching a name (at most one, names are unique)
    fn list_by_name(&self, platform_name: &str) -> Result<Vec<Platform>> {
        let mut conn = get_connection(&self.pool)?;

        platforms::table
            .filter(platforms::name.eq(platform_name))
            .order((platforms::sort_index.asc(), platforms::id.asc()))
            .load::<PlatformRow>(&mut conn)
            .map(|rows| rows.into_iter().map(Platform::from).collect())
            .map_err(Error::from)
    }

    /// Lists platforms of a given type
    fn list_by_type(&self, platform_type: PlatformType) -> Result<Vec<Platform>> {
        let mut conn = get_connection(&self.pool)?;

        platforms::table
            .filter(platforms::platform_type.eq(platform_type.as_str()))
            .order((platforms::sort_index.asc(), platforms::id.asc()))
            .load::<PlatformRow>(&mut conn)
            .map(|rows| rows.into_iter().map(Platform::from).collect())
            .map_err(Error::from)
    }

    /// Lists the distinct platform types currently in use
    fn list_types(&self) -> Result<Vec<PlatformType>> {
        let mut conn = get_connection(&self.pool)?;

        let stored: Vec<Option<String>> = platforms::table
            .select(platforms::platform_type)
            .distinct()
            .filter(platforms::platform_type.is_not_null())
            .order(platforms::platform_type.asc())
            .load(&mut conn)
            .map_err(Error::from)?;

        Ok(stored
            .into_iter()
            .flatten()
            .filter_map(|s| PlatformType::parse(&s))
            .collect())
    }

    /// Saves a platform: insert when id is unset (0), update otherwise
    async fn save(&self, platform: Platform) -> Result<()> {
        let row = PlatformRow::from(platform);

        self.writer
            .exec(move |conn| {
                if row.id == 0 {
                    let new_row = NewPlatformRow {
                        name: row.name,
                        platform_type: row.platform_type,
                        sort_index: row.sort_index,
                    };
                    diesel::insert_into(platforms::table)
                        .values(&new_row)
                        .execute(conn)?;
                } else {
                    let affected = diesel::update(platforms::table.find(row.id))
                        .set(&row)
                        .execute(conn)?;
                    if affected == 0 {
                        return Err(Error::NotFound(format!(
                            "Platform with id {} not found",
                            row.id
                        )));
                    }
                }
                Ok(())
            })
            .await?;

        self.events.publish(TableChange::Platforms);
        Ok(())
    }

    /// Inserts a new platform at the top of the list.
    ///
    /// Bumps every existing sort_index by one, then inserts the new row at
    /// sort_index 0. Both steps run in one writer job, so no reader can
    /// observe a partially applied order.
    async fn insert_at_top(&self, new_platform: NewPlatform) -> Result<()> {
        new_platform.validate()?;
        let new_row = new_platform.into_row_at_top();

        self.writer
            .exec(move |conn| {
                diesel::update(platforms::table)
                    .set(platforms::sort_index.eq(platforms::sort_index + 1))
                    .execute(conn)?;

                diesel::insert_into(platforms::table)
                    .values(&new_row)
                    .execute(conn)?;

                Ok(())
            })
            .await?;

        self.events.publish(TableChange::Platforms);
        Ok(())
    }

    /// Persists a full ordering: `sort_index = position` for each id, in order.
    ///
    /// Each row update is idempotent, so a retry after a partial failure is
    /// safe to re-apply. The single writer guarantees two batches never
    /// interleave row-by-row.
    async fn update_sort_indices(&self, ids_in_order: Vec<i32>) -> Result<()> {
        debug!("Persisting platform order: {:?}", ids_in_order);

        self.writer
            .exec(move |conn| {
                for (position, platform_id) in ids_in_order.iter().enumerate() {
                    diesel::update(platforms::table.find(platform_id))
                        .set(platforms::sort_index.eq(position as i32))
                        .execute(conn)?;
                }
                Ok(())
            })
            .await?;

        self.events.publish(TableChange::Platforms);
        Ok(())
    }

    /// Deletes a platform; its accounts go with it (store-level cascade)
    async fn delete(&self, platform_id: i32) -> Result<()> {
        let affected = self
            .writer
            .exec(move |conn| {
                diesel::delete(platforms::table.find(platform_id))
                    .execute(conn)
                    .map_err(Error::from)
            })
            .await?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "Platform with id {} not found",
                platform_id
            )));
        }

        self.events.publish(TableChange::Platforms);
        // Cascade may have removed account rows as well.
        self.events.publish(TableChange::Accounts);
        Ok(())
    }
}
