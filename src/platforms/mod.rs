// Module declarations
pub(crate) mod platforms_model;
pub(crate) mod platforms_repository;
pub(crate) mod platforms_traits;

// Re-export the public interface
pub use platforms_model::{NewPlatform, Platform, PlatformRow, PlatformType};
pub use platforms_repository::PlatformRepository;
pub use platforms_traits::PlatformRepositoryTrait;
