// src/core/database.rs
//! SQLite connection management and schema migrations

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database, one connection so every query sees the same data
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                linkedin_url TEXT PRIMARY KEY,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                current_title TEXT NOT NULL DEFAULT '',
                current_company TEXT NOT NULL DEFAULT '',
                previous_title TEXT NOT NULL DEFAULT '',
                previous_company TEXT NOT NULL DEFAULT '',
                last_checked TEXT NOT NULL,
                tracking_status TEXT NOT NULL DEFAULT 'active',
                outreach_status TEXT NOT NULL DEFAULT 'not_contacted',
                skills TEXT NOT NULL DEFAULT '[]',
                education TEXT NOT NULL DEFAULT '[]'
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create profiles table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS changes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                linkedin_url TEXT NOT NULL,
                detected_at TEXT NOT NULL,
                old_title TEXT NOT NULL DEFAULT '',
                new_title TEXT NOT NULL DEFAULT '',
                old_company TEXT NOT NULL DEFAULT '',
                new_company TEXT NOT NULL DEFAULT '',
                is_founder_change BOOLEAN NOT NULL DEFAULT FALSE,
                insight TEXT,
                notification_sent BOOLEAN NOT NULL DEFAULT FALSE
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create changes table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS outreach (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                linkedin_url TEXT NOT NULL,
                change_id INTEGER,
                outreach_date TEXT NOT NULL,
                method TEXT NOT NULL DEFAULT 'Email',
                response_received BOOLEAN NOT NULL DEFAULT FALSE,
                notes TEXT NOT NULL DEFAULT '',
                follow_up_date TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create outreach table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_outreach_url ON outreach(linkedin_url);")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_changes_url ON changes(linkedin_url);")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_changes_founder ON changes(is_founder_change, detected_at);",
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
