//! PostgreSQL database operations

use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with(database_url, 10).await
    }

    /// Connect using the server configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::connect_with(&config.database_url, config.max_connections).await
    }

    /// Pool that only connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    async fn connect_with(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Start a transaction
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    // === Device Repository ===

    /// Create a new device with generated token
    pub async fn create_device(&self, name: Option<&str>) -> Result<Device> {
        let token = Uuid::new_v4().to_string();
        let device = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (token, name)
            VALUES ($1, $2)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(device)
    }

    /// Get device by token
    pub async fn get_device_by_token(&self, token: &str) -> Result<Option<Device>> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM devices
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(device)
    }

    /// Update device last_seen_at timestamp
    pub async fn update_last_seen(&self, device_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE devices
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(device_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Review State Repository ===

    /// Get the review state for one item
    pub async fn get_review_state(
        &self,
        device_id: Uuid,
        item_key: &str,
    ) -> Result<Option<DbReviewState>> {
        let state = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT device_id, item_key, interval_days, ease_factor, repetitions,
                   last_reviewed_at, next_review_at, last_performance, updated_at
            FROM review_states
            WHERE device_id = $1 AND item_key = $2
            "#,
        )
        .bind(device_id)
        .bind(item_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    /// Get review states for a set of items (absent items are simply missing)
    pub async fn get_review_states(
        &self,
        device_id: Uuid,
        item_keys: &[String],
    ) -> Result<Vec<DbReviewState>> {
        let states = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT device_id, item_key, interval_days, ease_factor, repetitions,
                   last_reviewed_at, next_review_at, last_performance, updated_at
            FROM review_states
            WHERE device_id = $1 AND item_key = ANY($2)
            "#,
        )
        .bind(device_id)
        .bind(item_keys)
        .fetch_all(&self.pool)
        .await?;

        Ok(states)
    }

    /// Get every review state for a device
    pub async fn get_all_review_states(&self, device_id: Uuid) -> Result<Vec<DbReviewState>> {
        let states = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT device_id, item_key, interval_days, ease_factor, repetitions,
                   last_reviewed_at, next_review_at, last_performance, updated_at
            FROM review_states
            WHERE device_id = $1
            ORDER BY item_key
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(states)
    }

    /// Count review states for a device
    pub async fn count_review_states(&self, device_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM review_states WHERE device_id = $1
            "#,
        )
        .bind(device_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Bulk reset: delete all review states for a device
    pub async fn delete_all_review_states(&self, device_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM review_states WHERE device_id = $1
            "#,
        )
        .bind(device_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Read an item's state and lock the row until the transaction ends
    pub async fn lock_review_state(
        conn: &mut PgConnection,
        device_id: Uuid,
        item_key: &str,
    ) -> Result<Option<DbReviewState>> {
        let state = sqlx::query_as::<_, DbReviewState>(
            r#"
            SELECT device_id, item_key, interval_days, ease_factor, repetitions,
                   last_reviewed_at, next_review_at, last_performance, updated_at
            FROM review_states
            WHERE device_id = $1 AND item_key = $2
            FOR UPDATE
            "#,
        )
        .bind(device_id)
        .bind(item_key)
        .fetch_optional(conn)
        .await?;

        Ok(state)
    }

    /// Insert or overwrite an item's state
    pub async fn upsert_review_state(conn: &mut PgConnection, state: &DbReviewState) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO review_states (device_id, item_key, interval_days, ease_factor, repetitions,
                                       last_reviewed_at, next_review_at, last_performance, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (device_id, item_key) DO UPDATE SET
                interval_days = EXCLUDED.interval_days,
                ease_factor = EXCLUDED.ease_factor,
                repetitions = EXCLUDED.repetitions,
                last_reviewed_at = EXCLUDED.last_reviewed_at,
                next_review_at = EXCLUDED.next_review_at,
                last_performance = EXCLUDED.last_performance,
                updated_at = NOW()
            "#,
        )
        .bind(state.device_id)
        .bind(&state.item_key)
        .bind(state.interval_days)
        .bind(state.ease_factor)
        .bind(state.repetitions)
        .bind(state.last_reviewed_at)
        .bind(state.next_review_at)
        .bind(&state.last_performance)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Store an uploaded state unless the stored one was reviewed at the same
    /// time or later. Returns whether the row changed.
    pub async fn merge_review_state(conn: &mut PgConnection, state: &DbReviewState) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO review_states (device_id, item_key, interval_days, ease_factor, repetitions,
                                       last_reviewed_at, next_review_at, last_performance, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (device_id, item_key) DO UPDATE SET
                interval_days = EXCLUDED.interval_days,
                ease_factor = EXCLUDED.ease_factor,
                repetitions = EXCLUDED.repetitions,
                last_reviewed_at = EXCLUDED.last_reviewed_at,
                next_review_at = EXCLUDED.next_review_at,
                last_performance = EXCLUDED.last_performance,
                updated_at = NOW()
            WHERE review_states.last_reviewed_at < EXCLUDED.last_reviewed_at
            "#,
        )
        .bind(state.device_id)
        .bind(&state.item_key)
        .bind(state.interval_days)
        .bind(state.ease_factor)
        .bind(state.repetitions)
        .bind(state.last_reviewed_at)
        .bind(state.next_review_at)
        .bind(&state.last_performance)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Review Repository ===

    /// Insert a review record
    pub async fn insert_review(conn: &mut PgConnection, review: &DbReview) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, device_id, item_key, performance, reviewed_at,
                                 interval_before, interval_after, ease_before, ease_after)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(review.id)
        .bind(review.device_id)
        .bind(&review.item_key)
        .bind(&review.performance)
        .bind(review.reviewed_at)
        .bind(review.interval_before)
        .bind(review.interval_after)
        .bind(review.ease_before)
        .bind(review.ease_after)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Get the review log for one item, oldest first
    pub async fn get_reviews_for_item(
        &self,
        device_id: Uuid,
        item_key: &str,
    ) -> Result<Vec<DbReview>> {
        let reviews = sqlx::query_as::<_, DbReview>(
            r#"
            SELECT id, device_id, item_key, performance, reviewed_at,
                   interval_before, interval_after, ease_before, ease_after, created_at
            FROM reviews
            WHERE device_id = $1 AND item_key = $2
            ORDER BY reviewed_at
            "#,
        )
        .bind(device_id)
        .bind(item_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
