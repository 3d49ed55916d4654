use async_trait::async_trait;

use super::platforms_model::{NewPlatform, Platform, PlatformType};
use crate::errors::Result;

/// Contract for platform persistence operations.
#[async_trait]
pub trait PlatformRepositoryTrait: Send + Sync {
    fn list(&self) -> Result<Vec<Platform>>;
    fn get_by_id(&self, platform_id: i32) -> Result<Platform>;
    fn list_by_name(&self, platform_name: &str) -> Result<Vec<Platform>>;
    fn list_by_type(&self, platform_type: PlatformType) -> Result<Vec<Platform>>;
    fn list_types(&self) -> Result<Vec<PlatformType>>;
    async fn save(&self, platform: Platform) -> Result<()>;
    async fn insert_at_top(&self, new_platform: NewPlatform) -> Result<()>;
    async fn update_sort_indices(&self, ids_in_order: Vec<i32>) -> Result<()>;
    async fn delete(&self, platform_id: i32) -> Result<()>;
}
