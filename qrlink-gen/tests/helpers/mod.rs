//! Test Helper Utilities
//!
//! Shared utilities for testing qrlink-gen

#![allow(dead_code)]

pub mod db_utils;
pub mod mock_api;

// Re-export commonly used items
pub use db_utils::{create_test_store, fetch_records, StoredRecord, TestStore};
pub use mock_api::{spawn_mock_api, spawn_server, MOCK_API_KEY, MOCK_SUMMARY};
