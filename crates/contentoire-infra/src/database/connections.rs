//! Connection pool for the main database.

#[cfg(feature = "postgres")]
use std::sync::Arc;
#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub main_url: String,
    pub main_max_connections: u32,
    pub main_min_connections: u32,
}

#[cfg(feature = "postgres")]
pub struct DatabaseConnections {
    /// Holds the `posts`, `users`, `providers` and `search_keywords` tables.
    /// Shared by reference since mock connections are not `Clone`.
    pub main: Arc<DbConn>,
}

#[cfg(not(feature = "postgres"))]
pub struct DatabaseConnections;

#[cfg(feature = "postgres")]
fn connect_options(url: &str, max: u32, min: u32) -> ConnectOptions {
    ConnectOptions::new(url)
        .max_connections(max)
        .min_connections(min.min(max))
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false)
        .to_owned()
}

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let main = Database::connect(connect_options(
            &config.main_url,
            config.main_max_connections,
            config.main_min_connections,
        ))
        .await?;
        tracing::info!(pool = config.main_max_connections, "Main database connected");

        Ok(Self {
            main: Arc::new(main),
        })
    }

    /// Whether the main pool can reach the server.
    pub async fn ping(&self) -> bool {
        match self.main.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database ping failed");
                false
            }
        }
    }
}

#[cfg(not(feature = "postgres"))]
impl DatabaseConnections {
    pub async fn ping(&self) -> bool {
        false
    }
}
