//! Integration tests for the record store against a temporary SQLite database

mod helpers;

use helpers::{create_test_store, fetch_records};
use qrlink_common::StageError;
use qrlink_gen::models::{ApiResult, QrRecord, RunInput, ABSENT_DESCRIPTION, QR_CODE_LABEL};
use qrlink_gen::store::RecordStore;
use tempfile::TempDir;

fn run_input() -> RunInput {
    RunInput {
        url: "https://example.com".to_string(),
        mobile_number: "5551234567".to_string(),
    }
}

#[tokio::test]
async fn test_insert_record_persists_row() {
    let fixture = create_test_store().await.unwrap();
    let store = RecordStore::new(&fixture.config_path);

    let api = ApiResult {
        body: Some("{}".to_string()),
        summary: Some("A short summary.".to_string()),
    };
    let rows = store
        .insert_record(&QrRecord::from_run(&run_input(), &api))
        .await
        .expect("Insert should succeed");
    assert_eq!(rows, 1);

    let records = fetch_records(&fixture.db_url).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].link, "https://example.com");
    assert_eq!(records[0].recipient_mobile_number, "5551234567");
    assert_eq!(records[0].generated_qr_code, QR_CODE_LABEL);
    assert_eq!(records[0].short_description.as_deref(), Some("A short summary."));
}

#[tokio::test]
async fn test_absent_summary_stored_as_marker() {
    let fixture = create_test_store().await.unwrap();
    let store = RecordStore::new(&fixture.config_path);

    store
        .insert_record(&QrRecord::from_run(&run_input(), &ApiResult::absent()))
        .await
        .unwrap();

    let records = fetch_records(&fixture.db_url).await.unwrap();
    assert_eq!(
        records[0].short_description.as_deref(),
        Some(ABSENT_DESCRIPTION)
    );
}

#[tokio::test]
async fn test_quotes_in_values_are_bound_not_interpolated() {
    let fixture = create_test_store().await.unwrap();
    let store = RecordStore::new(&fixture.config_path);

    let input = RunInput {
        url: "https://example.com/?q='); DROP TABLE qrcode_generator; --".to_string(),
        mobile_number: "555'123".to_string(),
    };
    let api = ApiResult {
        body: None,
        summary: Some("It's a \"quoted\" summary".to_string()),
    };
    store
        .insert_record(&QrRecord::from_run(&input, &api))
        .await
        .unwrap();

    let records = fetch_records(&fixture.db_url).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].link, input.url);
    assert_eq!(records[0].recipient_mobile_number, "555'123");
    assert_eq!(
        records[0].short_description.as_deref(),
        Some("It's a \"quoted\" summary")
    );
}

#[tokio::test]
async fn test_missing_keys_do_not_connect() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("never.db");
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("[db]\nurl = \"sqlite:{}?mode=rwc\"\n", db_path.display()),
    )
    .unwrap();

    let store = RecordStore::new(&config_path);
    let result = store
        .insert_record(&QrRecord::from_run(&run_input(), &ApiResult::absent()))
        .await;

    match result {
        Err(StageError::ConfigIncomplete(missing)) => {
            assert!(missing.contains("db.username"));
            assert!(missing.contains("db.password"));
            assert!(!missing.contains("db.url"));
        }
        other => panic!("Expected ConfigIncomplete, got {:?}", other),
    }
    assert!(!db_path.exists(), "No connection should have been opened");
}

#[tokio::test]
async fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::new(dir.path().join("absent.toml"));

    let result = store.execute("SELECT 1").await;
    assert!(matches!(result, Err(StageError::ConfigIncomplete(_))));
}

#[tokio::test]
async fn test_execute_update_matching_no_rows_succeeds() {
    let fixture = create_test_store().await.unwrap();
    let store = RecordStore::new(&fixture.config_path);

    let result = store
        .execute("UPDATE qrcode_generator SET short_description = 'x' WHERE id = -1")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_execute_select() {
    let fixture = create_test_store().await.unwrap();
    let store = RecordStore::new(&fixture.config_path);

    assert!(store
        .execute("SELECT link FROM qrcode_generator")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_execute_raw_insert() {
    let fixture = create_test_store().await.unwrap();
    let store = RecordStore::new(&fixture.config_path);

    store
        .execute(
            "INSERT INTO qrcode_generator (link, recipient_mobile_number, generated_qr_code, short_description) \
             VALUES ('https://a.example', '1', 'QRCOdeDmo', 'raw')",
        )
        .await
        .unwrap();

    let records = fetch_records(&fixture.db_url).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].short_description.as_deref(), Some("raw"));
}

#[tokio::test]
async fn test_execute_malformed_sql_fails() {
    let fixture = create_test_store().await.unwrap();
    let store = RecordStore::new(&fixture.config_path);

    let result = store.execute("INSERT INTO nowhere VALUES (").await;
    assert!(matches!(result, Err(StageError::Persistence(_))));
}

#[tokio::test]
async fn test_execute_blank_sql_rejected() {
    let fixture = create_test_store().await.unwrap();
    let store = RecordStore::new(&fixture.config_path);

    let result = store.execute("   ").await;
    assert!(matches!(result, Err(StageError::InvalidArgument(_))));
}
