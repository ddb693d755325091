//! Gateway to the durable data store.
//!
//! The store knows nothing about tasks or projects beyond their table names: it moves
//! JSON-shaped [`Record`]s in and out, and the repository converts them at its boundary.

use async_trait::async_trait;
use thiserror::Error;

pub mod sql;

pub use sql::SqlStore;

/// A stored row, keyed by column name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The two kinds of records kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tasks,
    Projects,
}

impl EntityKind {
    /// Name of the table holding this kind of record.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Tasks => "tasks",
            EntityKind::Projects => "projects",
        }
    }

    /// Idempotent statement creating the table for this kind of record.
    pub fn create_table_statement(&self) -> &'static str {
        match self {
            EntityKind::Tasks => CREATE_TASKS_TABLE,
            EntityKind::Projects => CREATE_PROJECTS_TABLE,
        }
    }
}

const CREATE_TASKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    completed BOOLEAN DEFAULT FALSE,
    priority TEXT DEFAULT 'medium',
    due_date TEXT,
    project_id TEXT DEFAULT 'inbox',
    user_id TEXT NOT NULL,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_PROJECTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    color TEXT DEFAULT '#3b82f6',
    user_id TEXT NOT NULL,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering applied when listing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: Direction,
}

impl OrderBy {
    pub fn ascending(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Ascending,
        }
    }

    pub fn descending(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Descending,
        }
    }
}

/// Errors reported by a data store.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
    #[error("No {kind:?} record with id '{id}'")]
    NotFound { kind: EntityKind, id: String },
    #[error("Data store unavailable: {0}")]
    Unavailable(String),
}

/// Create/read/update/delete access to the durable copy of tasks and projects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Lists every record of `kind` in the given order.
    async fn list(&self, kind: EntityKind, order: OrderBy) -> Result<Vec<Record>, Error>;

    /// Persists a new record and returns it as stored.
    async fn create(&self, kind: EntityKind, record: Record) -> Result<Record, Error>;

    /// Overwrites the given columns of the record with `id`.
    async fn update(&self, kind: EntityKind, id: &str, patch: Record) -> Result<(), Error>;

    /// Removes the record with `id`.
    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), Error>;

    /// Runs a raw statement. Only used to create missing tables.
    async fn execute(&self, statement: &str) -> Result<(), Error>;
}
