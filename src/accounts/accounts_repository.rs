use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::events::{EventBus, TableChange};
use crate::schema::{accounts, platforms};

use super::accounts_model::{Account, AccountRow, NewAccountRow};
use super::accounts_traits::AccountRepositoryTrait;
use crate::platforms::PlatformType;

/// Repository for managing credential records
pub struct AccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    events: EventBus,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, events: EventBus) -> Self {
        Self {
            pool,
            writer,
            events,
        }
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    /// Lists all accounts, newest first
    fn list(&self) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .order(accounts::id.desc())
            .load::<AccountRow>(&mut conn)
            .map(|rows| rows.into_iter().map(Account::from).collect())
            .map_err(Error::from)
    }

    /// Lists the accounts of one platform, newest first
    fn list_by_platform(&self, platform_id: i32) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .filter(accounts::platform_id.eq(platform_id))
            .order(accounts::id.desc())
            .load::<AccountRow>(&mut conn)
            .map(|rows| rows.into_iter().map(Account::from).collect())
            .map_err(Error::from)
    }

    /// Lists the accounts under a platform name, newest first
    fn list_by_platform_name(&self, platform_name: &str) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .inner_join(platforms::table)
            .filter(platforms::name.eq(platform_name))
            .select(AccountRow::as_select())
            .order(accounts::id.desc())
            .load::<AccountRow>(&mut conn)
            .map(|rows| rows.into_iter().map(Account::from).collect())
            .map_err(Error::from)
    }

    /// Lists the accounts under platforms of a given type, newest first
    fn list_by_platform_type(&self, platform_type: PlatformType) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .inner_join(platforms::table)
            .filter(platforms::platform_type.eq(platform_type.as_str()))
            .select(AccountRow::as_select())
            .order(accounts::id.desc())
            .load::<AccountRow>(&mut conn)
            .map(|rows| rows.into_iter().map(Account::from).collect())
            .map_err(Error::from)
    }

    /// Counts the accounts still referencing a platform
    fn count_by_platform(&self, platform_id: i32) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .filter(accounts::platform_id.eq(platform_id))
            .count()
            .get_result(&mut conn)
            .map_err(Error::from)
    }

    /// Keyword search across platform name (via join), login name, remark,
    /// phone and email. Substring match, newest first. Callers never pass
    /// an empty keyword.
    fn search(&self, keyword: &str) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;
        let pattern = format!("%{}%", keyword);

        accounts::table
            .inner_join(platforms::table)
            .filter(
                platforms::name
                    .like(pattern.clone())
                    .or(accounts::login_name.like(pattern.clone()))
                    .or(accounts::remark.like(pattern.clone()))
                    .or(accounts::phone.like(pattern.clone()))
                    .or(accounts::email.like(pattern)),
            )
            .select(AccountRow::as_select())
            .order(accounts::id.desc())
            .load::<AccountRow>(&mut conn)
            .map(|rows| rows.into_iter().map(Account::from).collect())
            .map_err(Error::from)
    }

    /// Saves an account: insert when id is unset (0), update otherwise
    async fn save(&self, account: Account) -> Result<()> {
        account.validate()?;

        self.writer
            .exec(move |conn| {
                if account.id == 0 {
                    let new_row = NewAccountRow::from(account);
                    diesel::insert_into(accounts::table)
                        .values(&new_row)
                        .execute(conn)?;
                } else {
                    let row = AccountRow::from(account);
                    let affected = diesel::update(accounts::table.find(row.id))
                        .set(&row)
                        .execute(conn)?;
                    if affected == 0 {
                        return Err(Error::NotFound(format!(
                            "Account with id {} not found",
                            row.id
                        )));
                    }
                }
                Ok(())
            })
            .await?;

        self.events.publish(TableChange::Accounts);
        Ok(())
    }

    /// Deletes an account by its ID
    async fn delete(&self, account_id: i32) -> Result<()> {
        let affected = self
            .writer
            .exec(move |conn| {
                diesel::delete(accounts::table.find(account_id))
                    .execute(conn)
                    .map_err(Error::from)
            })
            .await?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "Account with id {} not found",
                account_id
            )));
        }

        self.events.publish(TableChange::Accounts);
        Ok(())
    }

    /// Deletes every account row
    async fn delete_all(&self) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::delete(accounts::table)
                    .execute(conn)
                    .map_err(Error::from)
            })
            .await?;

        self.events.publish(TableChange::Accounts);
        Ok(())
    }
}
