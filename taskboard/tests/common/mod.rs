#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;
use taskboard::auth::{ConfiguredIdentity, User};
use taskboard::repository::Repository;
use taskboard::store::{DataStore, SqlStore};

/// Connects to a fresh in-memory SQLite database without any tables.
///
/// The pool keeps a single connection, otherwise every connection would see its own
/// empty database.
pub async fn setup_store() -> anyhow::Result<SqlStore> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await?;
    Ok(SqlStore::new(db))
}

pub fn test_user() -> User {
    User {
        id: "user-1".to_string(),
        email: "ada@example.com".to_string(),
        display_name: Some("Ada".to_string()),
    }
}

/// Initializes a repository signed in as [`test_user`].
pub async fn setup_repository(store: Arc<dyn DataStore>) -> Repository {
    let identity = ConfiguredIdentity::new(Some(test_user()));
    Repository::initialize(store, &identity).await
}
