use std::sync::Arc;
use tempfile::TempDir;

use vault_core::accounts::AccountRepository;
use vault_core::db;
use vault_core::events::EventBus;
use vault_core::platforms::PlatformRepository;

/// A vault over a throwaway database. The temp dir lives as long as the
/// fixture does; the repositories keep the pool and write actor alive.
pub struct TestVault {
    pub events: EventBus,
    pub platforms: Arc<PlatformRepository>,
    pub accounts: Arc<AccountRepository>,
    _dir: TempDir,
}

/// Builds a fresh database, runs migrations and wires up both
/// repositories. Must be called from within a tokio runtime (the write
/// actor is a spawned task).
pub fn setup() -> TestVault {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().to_string_lossy().to_string();

    let db_path = db::init(&data_dir).expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let writer = db::spawn_writer(pool.clone());
    let events = EventBus::new();

    let platforms = Arc::new(PlatformRepository::new(
        pool.clone(),
        writer.clone(),
        events.clone(),
    ));
    let accounts = Arc::new(AccountRepository::new(
        pool.clone(),
        writer.clone(),
        events.clone(),
    ));

    TestVault {
        events,
        platforms,
        accounts,
        _dir: dir,
    }
}
