use async_trait::async_trait;

use super::accounts_model::Account;
use crate::errors::Result;
use crate::platforms::PlatformType;

/// Contract for account persistence operations.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    fn list(&self) -> Result<Vec<Account>>;
    fn list_by_platform(&self, platform_id: i32) -> Result<Vec<Account>>;
    fn list_by_platform_name(&self, platform_name: &str) -> Result<Vec<Account>>;
    fn list_by_platform_type(&self, platform_type: PlatformType) -> Result<Vec<Account>>;
    fn count_by_platform(&self, platform_id: i32) -> Result<i64>;
    fn search(&self, keyword: &str) -> Result<Vec<Account>>;
    async fn save(&self, account: Account) -> Result<()>;
    async fn delete(&self, account_id: i32) -> Result<()>;
    async fn delete_all(&self) -> Result<()>;
}
