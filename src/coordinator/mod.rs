// Module declarations
pub(crate) mod coordinator_model;
pub(crate) mod coordinator_service;

// Re-export the public interface
pub use coordinator_model::{group_by_platform, NewCredential, ViewState};
pub use coordinator_service::VaultCoordinator;
