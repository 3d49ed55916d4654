pub mod db;

pub mod accounts;
pub mod capabilities;
pub mod constants;
pub mod coordinator;
pub mod errors;
pub mod events;
pub mod platforms;
pub mod reorder;
pub mod schema;

pub use coordinator::{NewCredential, VaultCoordinator, ViewState};
pub use errors::{Error, Result};
