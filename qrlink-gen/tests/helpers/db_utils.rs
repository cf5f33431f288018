//! Database Test Utilities
//!
//! Temporary SQLite databases plus the key-value config file that points the
//! record store at them.

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

const CREATE_TABLE: &str = "CREATE TABLE qrcode_generator (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    link TEXT NOT NULL,
    recipient_mobile_number TEXT NOT NULL,
    generated_qr_code TEXT NOT NULL,
    short_description TEXT
)";

/// Row of `qrcode_generator` as read back by tests
#[derive(Debug, sqlx::FromRow)]
pub struct StoredRecord {
    pub link: String,
    pub recipient_mobile_number: String,
    pub generated_qr_code: String,
    pub short_description: Option<String>,
}

/// Temporary database and config file
///
/// `dir` must be kept alive for the duration of the test.
pub struct TestStore {
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub db_url: String,
}

/// Create a SQLite database with the `qrcode_generator` table and a config
/// file carrying `db.url`, `db.username` and `db.password`
pub async fn create_test_store() -> Result<TestStore> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("qrlink_test.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let pool = SqlitePool::connect(&db_url).await?;
    sqlx::query(CREATE_TABLE).execute(&pool).await?;
    pool.close().await;

    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[db]\nurl = \"{}\"\nusername = \"app\"\npassword = \"secret\"\n",
            db_url
        ),
    )?;

    Ok(TestStore {
        dir,
        config_path,
        db_path,
        db_url,
    })
}

/// All rows in insertion order
pub async fn fetch_records(db_url: &str) -> Result<Vec<StoredRecord>> {
    let pool = SqlitePool::connect(db_url).await?;
    let rows = sqlx::query_as::<_, StoredRecord>(
        "SELECT link, recipient_mobile_number, generated_qr_code, short_description
         FROM qrcode_generator ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;
    pool.close().await;
    Ok(rows)
}
