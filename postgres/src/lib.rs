//! # Janseva Postgres
//!
//! `PostgreSQL`-backed [`TokenStore`] - the production source of truth.
//!
//! ## Concurrency
//!
//! The store trait's two mutation primitives map onto two database
//! mechanisms:
//!
//! - [`TokenStore::transition`] is a single conditional
//!   `UPDATE ... WHERE status = ANY($expected)` - one round trip, atomic
//!   per row, no application-layer read-then-write.
//! - [`TokenStore::advance`] runs in a transaction that takes
//!   `SELECT ... FOR UPDATE` over the office/day's active rows. Concurrent
//!   advances for the same office queue up behind the row locks and
//!   re-evaluate against committed state, so two calls can never both
//!   promote a token to serving.
//!
//! Queries are runtime strings (no compile-time database connection is
//! required to build the workspace).

mod row;

use chrono::{DateTime, NaiveDate, Utc};
use janseva_core::ordering::advance_plan;
use janseva_core::status::TokenStatus;
use janseva_core::store::{Advance, StatusChange, TokenStore, TokenStoreError};
use janseva_core::types::{CitizenId, OfficeId, OfficialId, Token, TokenId};
use row::{TokenRow, into_tokens};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;

/// Column list shared by every query that reads whole tokens.
const TOKEN_COLUMNS: &str = "id, token_number, owner_id, office_id, office_name, service_id, \
     service_name, appointment_date, appointment_time, status, position_in_queue, \
     estimated_wait_minutes, created_at, updated_at, served_at, served_by";

fn active_statuses() -> Vec<String> {
    TokenStatus::ACTIVE
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

fn db_error(error: sqlx::Error) -> TokenStoreError {
    TokenStoreError::Database(error.to_string())
}

/// `PostgreSQL`-backed token store.
#[derive(Clone)]
pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to a database URL with a small default pool.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Database`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, TokenStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(pool))
    }

    /// Apply embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), TokenStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TokenStoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Borrow the underlying pool (for health checks).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Finalize one row inside an advance transaction.
    async fn apply_change_tx(
        tx: &mut Transaction<'_, Postgres>,
        token_id: TokenId,
        change: &StatusChange,
    ) -> Result<Token, TokenStoreError> {
        let sql = format!(
            "UPDATE tokens
             SET status = $2,
                 updated_at = $3,
                 served_at = COALESCE($4, served_at),
                 served_by = COALESCE($5, served_by),
                 position_in_queue = NULL,
                 estimated_wait_minutes = NULL
             WHERE id = $1
             RETURNING {TOKEN_COLUMNS}"
        );
        let terminal = matches!(change.to, TokenStatus::Completed | TokenStatus::Skipped);
        let row: TokenRow = sqlx::query_as(&sql)
            .bind(token_id.as_uuid())
            .bind(change.to.as_str())
            .bind(change.at)
            .bind(terminal.then_some(change.at))
            .bind(if terminal {
                change.by.map(|b| *b.as_uuid())
            } else {
                None
            })
            .fetch_one(&mut **tx)
            .await
            .map_err(db_error)?;
        row.into_token()
    }
}

impl TokenStore for PostgresTokenStore {
    fn insert(
        &self,
        token: Token,
    ) -> Pin<Box<dyn Future<Output = Result<Token, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let sql = format!(
                "INSERT INTO tokens ({TOKEN_COLUMNS})
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                 RETURNING {TOKEN_COLUMNS}"
            );
            #[allow(clippy::cast_possible_wrap)] // positions stay far below i32::MAX
            let result: Result<TokenRow, sqlx::Error> = sqlx::query_as(&sql)
                .bind(token.id.as_uuid())
                .bind(token.token_number.as_str())
                .bind(token.owner_id.as_uuid())
                .bind(token.office_id.as_str())
                .bind(&token.office_name)
                .bind(token.service_id.as_str())
                .bind(&token.service_name)
                .bind(token.appointment_date)
                .bind(&token.appointment_time)
                .bind(token.status.as_str())
                .bind(token.position_in_queue.map(|v| v as i32))
                .bind(token.estimated_wait_minutes.map(|v| v as i32))
                .bind(token.created_at)
                .bind(token.updated_at)
                .bind(token.served_at)
                .bind(token.served_by.map(|b| *b.as_uuid()))
                .fetch_one(&self.pool)
                .await;

            match result {
                Ok(row) => row.into_token(),
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    Err(TokenStoreError::DuplicateTokenNumber(token.token_number))
                }
                Err(other) => Err(db_error(other)),
            }
        })
    }

    fn get(
        &self,
        token_id: TokenId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Token>, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let sql = format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE id = $1");
            let row: Option<TokenRow> = sqlx::query_as(&sql)
                .bind(token_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
            row.map(TokenRow::into_token).transpose()
        })
    }

    fn active_for_office(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {TOKEN_COLUMNS} FROM tokens
                 WHERE office_id = $1 AND appointment_date = $2 AND status = ANY($3)"
            );
            let rows: Vec<TokenRow> = sqlx::query_as(&sql)
                .bind(office_id.as_str())
                .bind(date)
                .bind(active_statuses())
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
            into_tokens(rows)
        })
    }

    fn for_owner(
        &self,
        owner_id: CitizenId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {TOKEN_COLUMNS} FROM tokens
                 WHERE owner_id = $1
                 ORDER BY appointment_date DESC, created_at DESC"
            );
            let rows: Vec<TokenRow> = sqlx::query_as(&sql)
                .bind(owner_id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
            into_tokens(rows)
        })
    }

    fn for_office_date(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Token>, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {TOKEN_COLUMNS} FROM tokens
                 WHERE office_id = $1 AND appointment_date = $2"
            );
            let rows: Vec<TokenRow> = sqlx::query_as(&sql)
                .bind(office_id.as_str())
                .bind(date)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
            into_tokens(rows)
        })
    }

    fn next_daily_sequence(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
    ) -> Pin<Box<dyn Future<Output = Result<u32, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let (value,): (i32,) = sqlx::query_as(
                "INSERT INTO token_sequences (office_id, appointment_date, last_value)
                 VALUES ($1, $2, 1)
                 ON CONFLICT (office_id, appointment_date)
                 DO UPDATE SET last_value = token_sequences.last_value + 1
                 RETURNING last_value",
            )
            .bind(office_id.as_str())
            .bind(date)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
            u32::try_from(value)
                .map_err(|_| TokenStoreError::Serialization("negative sequence".to_string()))
        })
    }

    fn transition(
        &self,
        token_id: TokenId,
        expected: Vec<TokenStatus>,
        change: StatusChange,
    ) -> Pin<Box<dyn Future<Output = Result<Token, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let sql = format!(
                "UPDATE tokens
                 SET status = $2,
                     updated_at = $3,
                     served_at = COALESCE($4, served_at),
                     served_by = COALESCE($5, served_by),
                     position_in_queue = CASE WHEN $6 THEN position_in_queue ELSE NULL END,
                     estimated_wait_minutes = CASE WHEN $6 THEN estimated_wait_minutes ELSE NULL END
                 WHERE id = $1 AND status = ANY($7)
                 RETURNING {TOKEN_COLUMNS}"
            );
            let terminal = matches!(change.to, TokenStatus::Completed | TokenStatus::Skipped);
            let expected_strs: Vec<String> =
                expected.iter().map(|s| s.as_str().to_string()).collect();
            let row: Option<TokenRow> = sqlx::query_as(&sql)
                .bind(token_id.as_uuid())
                .bind(change.to.as_str())
                .bind(change.at)
                .bind(terminal.then_some(change.at))
                .bind(if terminal {
                    change.by.map(|b| *b.as_uuid())
                } else {
                    None
                })
                .bind(change.to.is_queue_eligible())
                .bind(expected_strs)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

            match row {
                Some(row) => row.into_token(),
                // No row matched: tell NotFound apart from a status the
                // caller did not expect.
                None => {
                    let current: Option<(String,)> =
                        sqlx::query_as("SELECT status FROM tokens WHERE id = $1")
                            .bind(token_id.as_uuid())
                            .fetch_optional(&self.pool)
                            .await
                            .map_err(db_error)?;
                    match current {
                        None => Err(TokenStoreError::NotFound(token_id)),
                        Some((status,)) => Err(TokenStoreError::InvalidState {
                            current: status.parse().map_err(|e| {
                                TokenStoreError::Serialization(format!("status column: {e}"))
                            })?,
                        }),
                    }
                }
            }
        })
    }

    fn advance(
        &self,
        office_id: OfficeId,
        date: NaiveDate,
        now: DateTime<Utc>,
        official_id: OfficialId,
    ) -> Pin<Box<dyn Future<Output = Result<Advance, TokenStoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(db_error)?;

            // Lock the office's active rows for the day. Concurrent
            // advances serialize here and re-read committed state.
            let sql = format!(
                "SELECT {TOKEN_COLUMNS} FROM tokens
                 WHERE office_id = $1 AND appointment_date = $2 AND status = ANY($3)
                 FOR UPDATE"
            );
            let rows: Vec<TokenRow> = sqlx::query_as(&sql)
                .bind(office_id.as_str())
                .bind(date)
                .bind(active_statuses())
                .fetch_all(&mut *tx)
                .await
                .map_err(db_error)?;
            let active = into_tokens(rows)?;

            let plan = advance_plan(&active, date);
            let mut outcome = Advance::default();

            if let Some(id) = plan.complete {
                let change = StatusChange {
                    to: TokenStatus::Completed,
                    at: now,
                    by: Some(official_id),
                };
                outcome.completed = Some(Self::apply_change_tx(&mut tx, id, &change).await?);
            }
            if let Some(id) = plan.promote {
                let change = StatusChange {
                    to: TokenStatus::Serving,
                    at: now,
                    by: None,
                };
                outcome.serving = Some(Self::apply_change_tx(&mut tx, id, &change).await?);
            }

            tx.commit().await.map_err(db_error)?;
            Ok(outcome)
        })
    }

    fn recent_completions(
        &self,
        office_id: OfficeId,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DateTime<Utc>>, TokenStoreError>> + Send + '_>>
    {
        Box::pin(async move {
            let rows: Vec<(DateTime<Utc>,)> = sqlx::query_as(
                "SELECT served_at FROM tokens
                 WHERE office_id = $1 AND status = 'completed' AND served_at IS NOT NULL
                 ORDER BY served_at DESC
                 LIMIT $2",
            )
            .bind(office_id.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
            Ok(rows.into_iter().map(|(at,)| at).collect())
        })
    }
}
