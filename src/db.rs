use crate::config::Config;
use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::path::Path;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

pub struct Database {
    _db: LibsqlDatabase,
    conn: Connection,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        let mut rows = conn.query(query, libsql::params![name]).await?;
        Ok(rows.next().await?.is_some())
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let location = cfg.app.database_location(data_dir);
        tracing::info!(database = %location, "[db] opening local database");
        Self::open(&location).await
    }

    /// Opens (or creates) a local database and brings its schema up to date.
    /// Pass `:memory:` for a throwaway database.
    pub async fn open(location: &str) -> Result<Self> {
        let db = Builder::new_local(location).build().await?;

        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        // The system table has to exist before anything can be recorded in it.
        for (filename, sql) in SYSTEM_MIGRATIONS {
            conn.execute_batch(sql).await?;
            Self::record_migration_once(&conn, filename).await?;
        }

        for (filename, sql) in crate::bookmarks::migrations() {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database { _db: db, conn })
    }

    async fn record_migration_once(conn: &Connection, name: &str) -> Result<()> {
        if !Self::is_migration_applied(conn, name).await? {
            Self::record_migration(conn, name).await?;
        }
        Ok(())
    }
}
