/// Public library interface for the MonkPoint MCP server
///
/// This module exports the calendar core, the storage layer, the analytics
/// engine and the MCP server so they can be used by other applications or tests.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub mod analytics;
pub mod calendar;
pub mod config;
pub mod domain;
pub mod mcp;
pub mod storage;
pub mod tools;

pub use analytics::AnalyticsEngine;
pub use calendar::CalendarError;
pub use config::{Config, ConfigError};
pub use domain::*;
pub use storage::{ActivityStore, SqliteStorage, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// MonkPoint server that implements the MCP protocol
///
/// Owns the SQLite datastore and the local user profile every tool call
/// runs for.
pub struct MonkPointServer {
    engine: AnalyticsEngine<SqliteStorage>,
    user: User,
}

impl MonkPointServer {
    /// Create a server over the database at `db_path`
    ///
    /// Initializes the schema if needed and loads the configured profile,
    /// creating it on first start.
    pub async fn new(db_path: PathBuf, config: Config) -> Result<Self, ServerError> {
        tracing::info!("Initializing MonkPoint server with database: {:?}", db_path);
        let storage = SqliteStorage::new(db_path)?;
        Self::with_storage(storage, config).await
    }

    /// Create a server over an already opened datastore
    pub async fn with_storage(storage: SqliteStorage, config: Config) -> Result<Self, ServerError> {
        let timezone = calendar::resolve_timezone(config.user_timezone(), config.calendar.timezone_policy)?;
        let user = load_or_create_user(&storage, &config.user.display_name, timezone.name()).await?;

        let engine = AnalyticsEngine::new(Arc::new(storage), config.calendar);
        Ok(Self { engine, user })
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin closes or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        let habits = self.engine.store().list_habits(self.user.id, true).await?;
        tracing::info!(
            user = %self.user.display_name,
            timezone = %self.user.timezone,
            "Server started successfully, found {} active habits",
            habits.len()
        );

        let mut mcp_server = mcp::McpServer::new(self.engine, self.user);
        mcp_server.run().await
    }

    /// Get the analytics engine (useful for testing)
    pub fn engine(&self) -> &AnalyticsEngine<SqliteStorage> {
        &self.engine
    }

    /// Get the local user profile (useful for testing)
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Turn into an MCP server without binding stdin/stdout
    pub fn into_mcp(self) -> mcp::McpServer<SqliteStorage> {
        mcp::McpServer::new(self.engine, self.user)
    }
}

async fn load_or_create_user<S: ActivityStore>(
    store: &S,
    display_name: &str,
    timezone: &str,
) -> Result<User, ServerError> {
    match store.find_user_by_name(display_name).await? {
        Some(mut user) => {
            if user.timezone != timezone {
                tracing::info!("Updating timezone for {} to {}", display_name, timezone);
                store.update_user_timezone(user.id, timezone).await?;
                user.timezone = timezone.to_string();
            }
            Ok(user)
        }
        None => {
            let user = User::new(display_name.to_string(), timezone.to_string());
            store.create_user(&user).await?;
            tracing::info!("Created profile {}", display_name);
            Ok(user)
        }
    }
}
