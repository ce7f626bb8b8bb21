use sharp_models::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::info;
use crate::migrations::{get_migrations, statements};

pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    /// Open (creating if needed) the SQLite database at `database_url`.
    ///
    /// A single connection is kept so `sqlite::memory:` sees one database.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        info!("🗄️ Connected to {}", database_url);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i32, _>("health") == 1)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        for (version, sql) in get_migrations() {
            for stmt in statements(sql) {
                sqlx::query(&stmt).execute(&self.pool).await?;
            }
            info!("📜 Applied migration {}", version);
        }
        Ok(())
    }
}
