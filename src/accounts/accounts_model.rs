use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Domain model for a credential record belonging to one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub platform_id: i32,
    pub remark: Option<String>,
    pub login_name: Option<String>,
    pub password: String,
    pub pay_password: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
}

impl Account {
    /// Validates the account data before it reaches the store
    pub fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "password".to_string(),
            )));
        }
        Ok(())
    }
}

/// Database row for accounts
#[derive(Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
// Updates replace the whole row; a cleared optional field must become NULL.
#[diesel(treat_none_as_null = true)]
pub struct AccountRow {
    pub id: i32,
    pub platform_id: i32,
    pub remark: Option<String>,
    pub login_name: Option<String>,
    pub password: String,
    pub pay_password: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
}

/// Insertable row for accounts (id is generated by the store)
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
pub struct NewAccountRow {
    pub platform_id: i32,
    pub remark: Option<String>,
    pub login_name: Option<String>,
    pub password: String,
    pub pay_password: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
}

// Conversion implementations
impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            platform_id: row.platform_id,
            remark: row.remark,
            login_name: row.login_name,
            password: row.password,
            pay_password: row.pay_password,
            phone: row.phone,
            email: row.email,
            id_number: row.id_number,
        }
    }
}

impl From<Account> for AccountRow {
    fn from(domain: Account) -> Self {
        Self {
            id: domain.id,
            platform_id: domain.platform_id,
            remark: domain.remark,
            login_name: domain.login_name,
            password: domain.password,
            pay_password: domain.pay_password,
            phone: domain.phone,
            email: domain.email,
            id_number: domain.id_number,
        }
    }
}

impl From<Account> for NewAccountRow {
    fn from(domain: Account) -> Self {
        Self {
            platform_id: domain.platform_id,
            remark: domain.remark,
            login_name: domain.login_name,
            password: domain.password,
            pay_password: domain.pay_password,
            phone: domain.phone,
            email: domain.email,
            id_number: domain.id_number,
        }
    }
}
