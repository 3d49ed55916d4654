// Module declarations
pub(crate) mod accounts_model;
pub(crate) mod accounts_repository;
pub(crate) mod accounts_traits;

// Re-export the public interface
pub use accounts_model::{Account, AccountRow};
pub use accounts_repository::AccountRepository;
pub use accounts_traits::AccountRepositoryTrait;
