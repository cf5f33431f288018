//! Record store for generated QR codes
//!
//! Opens one database connection per call using the `db.url`, `db.username`
//! and `db.password` keys of the config file, runs a single statement, and
//! closes the connection on every path. SQLite, PostgreSQL and MySQL URLs are
//! accepted through sqlx's `Any` driver; a leading `jdbc:` prefix is ignored.

use crate::models::QrRecord;
use qrlink_common::config::get_value;
use qrlink_common::{Error, Result, StageError, StageResult};
use sqlx::{AnyConnection, Connection};
use std::path::PathBuf;
use tracing::{error, info, warn};
use url::Url;

/// Table written by [`RecordStore::insert_record`]
pub const TABLE_NAME: &str = "qrcode_generator";

pub const DB_URL_KEY: &str = "db.url";
pub const DB_USERNAME_KEY: &str = "db.username";
pub const DB_PASSWORD_KEY: &str = "db.password";

/// Database family behind a connection URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
    MySql,
}

impl Backend {
    pub fn from_url(url: &str) -> Option<Self> {
        let url = strip_jdbc(url).to_ascii_lowercase();
        if url.starts_with("sqlite:") {
            Some(Backend::Sqlite)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Some(Backend::Postgres)
        } else if url.starts_with("mysql:") {
            Some(Backend::MySql)
        } else {
            None
        }
    }

    /// Bind placeholder for the 1-based parameter `index`
    fn placeholder(self, index: usize) -> String {
        match self {
            Backend::Postgres => format!("${}", index),
            Backend::Sqlite | Backend::MySql => "?".to_string(),
        }
    }
}

/// Connection parameters read from the config file
#[derive(Debug, Clone)]
struct ConnectionParams {
    url: String,
    username: String,
    password: String,
}

/// Single-statement database access
#[derive(Debug, Clone)]
pub struct RecordStore {
    config_source: PathBuf,
}

impl RecordStore {
    /// Store reading its connection parameters from `config_source`
    pub fn new(config_source: impl Into<PathBuf>) -> Self {
        sqlx::any::install_default_drivers();
        Self {
            config_source: config_source.into(),
        }
    }

    /// Execute one raw SQL statement
    ///
    /// A SELECT succeeds when a result set comes back; any other statement
    /// succeeds when it executes, whatever the affected-row count.
    pub async fn execute(&self, sql: &str) -> StageResult<()> {
        if sql.trim().is_empty() {
            error!("Query cannot be empty");
            return Err(StageError::InvalidArgument(
                "query cannot be empty".to_string(),
            ));
        }

        let params = self.load_params()?;
        let mut conn = connect(&params).await?;

        let result = run_raw(&mut conn, sql).await;
        close_quietly(conn).await;

        result.map_err(|e| {
            error!(query = sql, error = %e, "SQL error executing query");
            to_stage_error(e)
        })
    }

    /// Insert one row into `qrcode_generator` using bound parameters
    ///
    /// Returns the affected-row count.
    pub async fn insert_record(&self, record: &QrRecord) -> StageResult<u64> {
        let params = self.load_params()?;
        let backend = Backend::from_url(&params.url).ok_or_else(|| {
            StageError::ConfigIncomplete(format!("unsupported database URL: {}", params.url))
        })?;
        let mut conn = connect(&params).await?;

        let sql = insert_statement(backend);
        let result = sqlx::query(&sql)
            .bind(record.link.clone())
            .bind(record.recipient_mobile_number.clone())
            .bind(record.generated_qr_code.clone())
            .bind(record.description_value().to_string())
            .execute(&mut conn)
            .await
            .map(|done| done.rows_affected())
            .map_err(Error::from);
        close_quietly(conn).await;

        match result {
            Ok(rows) => {
                info!(rows, table = TABLE_NAME, "Record inserted");
                Ok(rows)
            }
            Err(e) => {
                error!(table = TABLE_NAME, error = %e, "SQL error inserting record");
                Err(to_stage_error(e))
            }
        }
    }

    fn load_params(&self) -> StageResult<ConnectionParams> {
        let source = self.config_source.to_string_lossy();
        let url = get_value(&source, DB_URL_KEY);
        let username = get_value(&source, DB_USERNAME_KEY);
        let password = get_value(&source, DB_PASSWORD_KEY);

        match (url, username, password) {
            (Some(url), Some(username), Some(password)) => Ok(ConnectionParams {
                url,
                username,
                password,
            }),
            (url, username, password) => {
                let missing: Vec<&str> = [
                    (DB_URL_KEY, url.is_none()),
                    (DB_USERNAME_KEY, username.is_none()),
                    (DB_PASSWORD_KEY, password.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, is_missing)| is_missing.then_some(key))
                .collect();

                error!(missing = ?missing, "Database configuration is incomplete");
                Err(StageError::ConfigIncomplete(missing.join(", ")))
            }
        }
    }
}

fn insert_statement(backend: Backend) -> String {
    let placeholders: Vec<String> = (1..=4).map(|i| backend.placeholder(i)).collect();
    format!(
        "INSERT INTO {} (link, recipient_mobile_number, generated_qr_code, short_description) VALUES ({})",
        TABLE_NAME,
        placeholders.join(", ")
    )
}

fn is_select(sql: &str) -> bool {
    sql.trim_start().to_ascii_lowercase().starts_with("select")
}

async fn run_raw(conn: &mut AnyConnection, sql: &str) -> Result<()> {
    if is_select(sql) {
        let rows = sqlx::query(sql).fetch_all(&mut *conn).await?;
        info!(rows = rows.len(), "Query returned result set");
    } else {
        let done = sqlx::query(sql).execute(&mut *conn).await?;
        info!(
            rows_affected = done.rows_affected(),
            "Query executed successfully"
        );
    }
    Ok(())
}

async fn connect(params: &ConnectionParams) -> StageResult<AnyConnection> {
    let url = connection_url(params).map_err(to_stage_error)?;
    AnyConnection::connect(&url).await.map_err(|e| {
        error!(error = %e, "Failed to connect to database");
        StageError::Persistence(format!("connect: {}", e))
    })
}

async fn close_quietly(conn: AnyConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "Error closing database connection");
    }
}

fn strip_jdbc(url: &str) -> &str {
    url.strip_prefix("jdbc:").unwrap_or(url)
}

/// Connection URL with configured credentials filled in for network backends
///
/// Credentials already present in the URL are kept. SQLite URLs are passed
/// through unchanged.
fn connection_url(params: &ConnectionParams) -> Result<String> {
    let raw = strip_jdbc(&params.url);
    let backend = Backend::from_url(raw)
        .ok_or_else(|| Error::Config(format!("unsupported database URL: {}", params.url)))?;

    if backend == Backend::Sqlite {
        return Ok(raw.to_string());
    }

    let mut url = Url::parse(raw)
        .map_err(|e| Error::InvalidInput(format!("database URL {}: {}", params.url, e)))?;

    if url.username().is_empty() && !params.username.is_empty() {
        url.set_username(&params.username)
            .map_err(|_| Error::InvalidInput("database URL cannot carry a username".to_string()))?;
    }
    if url.password().is_none() && !params.password.is_empty() {
        url.set_password(Some(&params.password))
            .map_err(|_| Error::InvalidInput("database URL cannot carry a password".to_string()))?;
    }

    Ok(url.to_string())
}

fn to_stage_error(e: Error) -> StageError {
    match e {
        Error::Config(msg) | Error::InvalidInput(msg) => StageError::ConfigIncomplete(msg),
        other => StageError::Persistence(other.to_string()),
    }
}
