use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use lorekeeper_migration::{Migrator, MigratorTrait};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sea_orm::sqlx::{self, Executor};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, SqlxSqliteConnector, TransactionTrait};
use tracing::debug;

/// SQLite connection options shared by the migration pool and the main pool.
fn create_sqlite_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(90))
        .optimize_on_close(true, None)
        .pragma("cache_size", "-65536")
        .pragma("temp_store", "MEMORY")
}

async fn database_connection(path: &Path) -> Result<DatabaseConnection> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(90))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(3600))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("PRAGMA busy_timeout = 90000;").await?;
                conn.execute("PRAGMA foreign_keys = ON;").await?;

                let row: (i64,) = sqlx::query_as("PRAGMA busy_timeout;")
                    .fetch_one(&mut *conn)
                    .await?;
                debug!("new sqlite connection, busy_timeout = {}ms", row.0);
                Ok(())
            })
        })
        .connect_with(create_sqlite_options(path))
        .await?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

async fn migrate_database(path: &Path) -> Result<()> {
    if path.exists() {
        debug!("found database at {}, applying pending migrations", path.display());
    } else {
        debug!("database {} does not exist yet, creating it", path.display());
    }

    // migrations run on a single connection so they apply in order
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(create_sqlite_options(path))
        .await?;
    let connection = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
    Migrator::up(&connection, None).await?;

    pool.close().await;
    debug!("migrations finished, migration pool closed");
    Ok(())
}

/// Migrates the database at `path` and opens the shared connection pool.
pub async fn setup_database(path: &Path) -> Result<DatabaseConnection> {
    migrate_database(path).await?;
    database_connection(path).await
}

/// Begins a transaction and takes SQLite's write lock straight away.
///
/// Touching the `_write_lock` row as the first statement upgrades the
/// transaction to a writer before any read happens, so later writes in the
/// same transaction cannot fail with `SQLITE_BUSY_SNAPSHOT`.
pub async fn begin_write_transaction(connection: &DatabaseConnection) -> Result<DatabaseTransaction> {
    connection
        .execute_unprepared("CREATE TABLE IF NOT EXISTS _write_lock (id INTEGER PRIMARY KEY, ts INTEGER)")
        .await?;
    connection
        .execute_unprepared("INSERT OR IGNORE INTO _write_lock (id, ts) VALUES (1, 0)")
        .await?;

    let txn = connection.begin().await?;
    // waits up to busy_timeout if another writer holds the lock
    txn.execute_unprepared("UPDATE _write_lock SET ts = strftime('%s', 'now') WHERE id = 1")
        .await?;
    Ok(txn)
}

/// Fresh in-memory database with every migration applied.
#[cfg(test)]
pub async fn setup_test_database() -> DatabaseConnection {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    // one connection that never expires, otherwise the in-memory database disappears
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("failed to open in-memory database");
    let connection = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
    Migrator::up(&connection, None)
        .await
        .expect("failed to migrate in-memory database");
    connection
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{EntityTrait, PaginatorTrait};

    use lorekeeper_entity::campaign;

    #[tokio::test]
    async fn test_write_transaction_commits() {
        let db = setup_test_database().await;
        let txn = begin_write_transaction(&db).await.unwrap();
        txn.execute_unprepared(
            "INSERT INTO campaign (name, created_at) VALUES ('Phandelver', '2025-01-01 00:00:00')",
        )
        .await
        .unwrap();
        txn.commit().await.unwrap();
        assert_eq!(campaign::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_file_database_is_created_and_migrated() {
        let dir = std::env::temp_dir().join(format!("lorekeeper-db-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.sqlite");
        let db = setup_database(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(campaign::Entity::find().count(&db).await.unwrap(), 0);
        drop(db);
        let _ = std::fs::remove_dir_all(dir);
    }
}
