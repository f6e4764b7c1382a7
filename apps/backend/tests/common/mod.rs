//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the router against a database and a fixed clock
//! - Helper functions for creating test data
//! - Authentication helpers
//!
//! # Requirements
//! Database-backed tests require a PostgreSQL database (set DATABASE_URL).

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use hsk_flashcards_backend::db::Database;
use hsk_flashcards_backend::models::Device;
use hsk_flashcards_backend::{router, AppState};
use hsk_srs_core::FixedClock;

/// Connection string for contexts that never reach the database.
const UNREACHABLE_DATABASE_URL: &str = "postgres://nobody@127.0.0.1:1/none";

/// Instant the test clock starts at.
pub fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

/// Test context containing database connection, test clock and router.
///
/// Use this to set up integration tests with a real database connection.
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    pub clock: Arc<FixedClock>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self::build(db)
    }

    /// Create a context whose pool never connects.
    ///
    /// Use this for requests that are answered before any query runs.
    pub fn offline() -> Self {
        let db = Database::connect_lazy(UNREACHABLE_DATABASE_URL)
            .expect("Failed to build lazy pool");
        Self::build(db)
    }

    fn build(db: Database) -> Self {
        let clock = Arc::new(FixedClock::new(test_epoch()));
        let state = AppState::with_clock(db, clock.clone());
        let db = state.db.clone();
        let app = router(state);

        Self { db, clock, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Move the test clock forward.
    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }

    /// Create a test device and return its ID and token.
    pub async fn create_test_device(&self, name: Option<&str>) -> (Uuid, String) {
        let device = self
            .db
            .create_device(name)
            .await
            .expect("Failed to create test device");
        (device.id, device.token)
    }

    /// Get device by token.
    pub async fn get_device_by_token(&self, token: &str) -> Option<Device> {
        self.db.get_device_by_token(token).await.ok().flatten()
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a device.
    ///
    /// Call this after tests to remove test data.
    pub async fn cleanup_device(&self, device_id: Uuid) {
        // Delete in order due to foreign keys
        let _ = sqlx::query("DELETE FROM reviews WHERE device_id = $1")
            .bind(device_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM review_states WHERE device_id = $1")
            .bind(device_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(device_id)
            .execute(self.db.pool())
            .await;
    }
}
