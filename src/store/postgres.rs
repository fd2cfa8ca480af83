//! Postgres rating store with startup retry logic
//!
//! The production store. Owns a process-wide connection pool, bootstraps its
//! own schema, and serializes match commits through a transaction whose
//! guarded UPDATEs reject stale snapshots.

use crate::config::StoreSettings;
use crate::error::LedgerError;
use crate::store::RatingStore;
use crate::types::{Player, PlayerId, RatingScope, RatingUpdate};
use crate::utils::{current_timestamp, generate_player_id};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::time::sleep;
use tracing::{error, info, warn};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS players (
        id UUID PRIMARY KEY,
        display_name TEXT NOT NULL CHECK (display_name <> ''),
        kit TEXT NOT NULL CHECK (kit <> ''),
        matches BIGINT NOT NULL DEFAULT 0,
        rating DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
"#;

const INSERT_PLAYER: &str = r#"
    INSERT INTO players (id, display_name, kit, matches, rating, created_at, updated_at)
    VALUES ($1, $2, $3, 0, $4, $5, $5)
"#;

const SELECT_PLAYER: &str = r#"
    SELECT id, display_name, kit, matches, rating, created_at, updated_at
    FROM players WHERE id = $1
"#;

const SELECT_BY_KIT: &str = r#"
    SELECT id, display_name, kit, matches, rating, created_at, updated_at
    FROM players WHERE kit = $1 ORDER BY rating DESC
"#;

const AVG_LEAGUE: &str = "SELECT AVG(rating) FROM players";

const AVG_KIT: &str = "SELECT AVG(rating) FROM players WHERE kit = $1";

// The matches guard makes the UPDATE a compare-and-swap: a concurrent commit
// bumps the counter and this statement then matches zero rows.
const APPLY_RESULT: &str = r#"
    UPDATE players
    SET rating = $2, matches = matches + 1, updated_at = $4
    WHERE id = $1 AND matches = $3
"#;

/// Postgres-backed rating store
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect with bounded exponential-backoff retry and bootstrap the schema
    ///
    /// Exhausting the retries is a fatal startup error; per-call failures
    /// after this point are surfaced to callers without retry.
    pub async fn connect(settings: &StoreSettings) -> crate::error::Result<Self> {
        let pool = Self::connect_with_retry(settings).await?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(persistence)?;

        Ok(Self { pool })
    }

    /// Attempt to connect and ping with exponential backoff
    async fn connect_with_retry(settings: &StoreSettings) -> crate::error::Result<PgPool> {
        let mut attempt = 0;
        let mut delay = settings.retry_delay();

        loop {
            match Self::try_connect(settings).await {
                Ok(pool) => {
                    info!("Successfully connected to rating database");
                    return Ok(pool);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= settings.max_connect_attempts {
                        error!(
                            "Failed to connect to rating database after {} attempts",
                            attempt
                        );
                        return Err(LedgerError::Persistence {
                            message: format!("Max connect attempts exceeded: {}", e),
                        }
                        .into());
                    }

                    warn!(
                        "Database connection attempt {} failed: {}. Retrying in {:?}",
                        attempt, e, delay
                    );

                    sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
            }
        }
    }

    /// Single connect-and-ping attempt
    async fn try_connect(settings: &StoreSettings) -> Result<PgPool, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(&settings.database_url)
            .await?;

        // Liveness check before the pool is handed out
        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(pool)
    }
}

#[async_trait]
impl RatingStore for PostgresStore {
    async fn create_player(
        &self,
        display_name: &str,
        kit: &str,
        initial_rating: f64,
    ) -> crate::error::Result<PlayerId> {
        let id = generate_player_id();
        let now = current_timestamp();

        sqlx::query(INSERT_PLAYER)
            .bind(id)
            .bind(display_name)
            .bind(kit)
            .bind(initial_rating)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;

        Ok(id)
    }

    async fn get_player(&self, id: PlayerId) -> crate::error::Result<Player> {
        let player = sqlx::query_as::<_, Player>(SELECT_PLAYER)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        player.ok_or_else(|| {
            LedgerError::PlayerNotFound {
                player_id: id.to_string(),
            }
            .into()
        })
    }

    async fn list_by_kit(&self, kit: &str) -> crate::error::Result<Vec<Player>> {
        sqlx::query_as::<_, Player>(SELECT_BY_KIT)
            .bind(kit)
            .fetch_all(&self.pool)
            .await
            .map_err(persistence)
    }

    async fn average_rating(&self, scope: RatingScope) -> crate::error::Result<f64> {
        let average: Option<f64> = match &scope {
            RatingScope::League => sqlx::query_scalar(AVG_LEAGUE)
                .fetch_one(&self.pool)
                .await
                .map_err(persistence)?,
            RatingScope::Kit(kit) => sqlx::query_scalar(AVG_KIT)
                .bind(kit)
                .fetch_one(&self.pool)
                .await
                .map_err(persistence)?,
        };

        // AVG over an empty table is SQL NULL
        average.ok_or_else(|| {
            LedgerError::NoData {
                scope: scope.to_string(),
            }
            .into()
        })
    }

    async fn apply_match(
        &self,
        winner: &RatingUpdate,
        loser: &RatingUpdate,
    ) -> crate::error::Result<()> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;
        let now = current_timestamp();

        for update in lock_order(winner, loser) {
            let result = sqlx::query(APPLY_RESULT)
                .bind(update.id)
                .bind(update.new_rating)
                .bind(update.expected_matches)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| commit_error(e, update.id))?;

            if result.rows_affected() != 1 {
                // Dropping the transaction rolls back the sibling UPDATE, so
                // a conflicted pair never lands half-applied.
                return Err(LedgerError::UpdateConflict {
                    player_id: update.id.to_string(),
                }
                .into());
            }
        }

        tx.commit().await.map_err(persistence)?;
        Ok(())
    }
}

/// Fixed row-lock acquisition order for a match commit
///
/// Two transactions committing the same pair with swapped roles would lock
/// the rows in opposite orders and deadlock; always taking the smaller id
/// first keeps them queued instead.
fn lock_order<'a>(winner: &'a RatingUpdate, loser: &'a RatingUpdate) -> [&'a RatingUpdate; 2] {
    let mut pair = [winner, loser];
    pair.sort_by_key(|update| update.id);
    pair
}

/// Postgres SQLSTATE for "deadlock_detected"
const DEADLOCK_DETECTED: &str = "40P01";

fn is_deadlock(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == DEADLOCK_DETECTED)
        .unwrap_or(false)
}

/// Classify a commit failure: victims of the deadlock detector are pure
/// contention and must surface as a retryable conflict, not a persistence
/// fault.
fn commit_error(err: sqlx::Error, id: PlayerId) -> anyhow::Error {
    if is_deadlock(&err) {
        return LedgerError::UpdateConflict {
            player_id: id.to_string(),
        }
        .into();
    }
    persistence(err)
}

fn persistence(err: sqlx::Error) -> anyhow::Error {
    LedgerError::Persistence {
        message: err.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn update_for(id: Uuid) -> RatingUpdate {
        RatingUpdate {
            id,
            expected_matches: 0,
            new_rating: 1200.0,
        }
    }

    #[test]
    fn test_lock_order_is_canonical_for_swapped_roles() {
        let low = update_for(Uuid::from_u128(1));
        let high = update_for(Uuid::from_u128(2));

        // A-beats-B and B-beats-A must lock rows in the same order
        let forward = lock_order(&low, &high);
        let swapped = lock_order(&high, &low);
        assert_eq!(forward[0].id, low.id);
        assert_eq!(forward[1].id, high.id);
        assert_eq!(forward[0].id, swapped[0].id);
        assert_eq!(forward[1].id, swapped[1].id);
    }

    #[test]
    fn test_non_deadlock_errors_stay_persistence() {
        let err = sqlx::Error::RowNotFound;
        assert!(!is_deadlock(&err));

        let classified = commit_error(sqlx::Error::RowNotFound, Uuid::from_u128(7));
        assert!(matches!(
            classified.downcast_ref::<LedgerError>(),
            Some(LedgerError::Persistence { .. })
        ));
    }
}

