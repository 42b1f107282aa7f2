/// Public library interface for the Saturn Planner engine and MCP server
///
/// This module exports the scheduling, streak and recurrence engine, the
/// storage layer, and the server that exposes them as MCP tools.

use std::path::PathBuf;
use chrono::NaiveDate;
use thiserror::Error;

pub mod calendar;
pub mod domain;
pub mod tools;
pub mod mcp;
mod storage;
mod analytics;
mod config;

// Re-export public modules and types
pub use domain::*;
pub use storage::{PlannerStorage, SqliteStorage, StorageError, ToggleOutcome};
pub use analytics::{streak_message, AnalyticsEngine, HabitStats, WeeklyQuota, DEFAULT_RATE_WINDOW_DAYS};
pub use config::{ConfigError, PlannerConfig};
pub use tools::ToolError;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Planner server that backs the MCP tools
///
/// This server manages one user's habits, completions and tasks through a
/// SQLite database and computes their analytics on demand.
pub struct PlannerServer {
    storage: SqliteStorage,
    analytics: AnalyticsEngine,
    user_id: UserId,
    config: PlannerConfig,
}

impl PlannerServer {
    /// Create a new planner server with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf, config: PlannerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing Saturn Planner with database: {:?}", db_path);

        config.validate()?;
        let storage = SqliteStorage::new(&db_path)?;
        Ok(Self::with_storage(storage, config))
    }

    /// Build a server around an already opened storage
    pub fn with_storage(storage: SqliteStorage, config: PlannerConfig) -> Self {
        Self {
            storage,
            analytics: AnalyticsEngine::with_window(config.completion_rate_window_days),
            user_id: UserId::new(config.user_id.clone()),
            config,
        }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin closes or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let habits = self.storage.list_habits(&self.user_id, true)?;
        tracing::info!(
            "Server started for user '{}', found {} active habits",
            self.user_id,
            habits.len()
        );

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// The day tools treat as "today"
    pub fn today(&self) -> NaiveDate {
        calendar::today()
    }
}
