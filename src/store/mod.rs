//! Rating store interface and implementations
//!
//! This module defines the narrow persistence contract for player rating
//! records, with an in-memory implementation for tests and embedded use and
//! a Postgres implementation for production.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

use crate::types::{Player, PlayerId, RatingScope, RatingUpdate};
use async_trait::async_trait;

/// Trait for rating store operations
///
/// Implementations must be safe to share across concurrent tasks; every call
/// is an await point and may block on I/O.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Insert a new player record with a zero match counter
    ///
    /// Fails with `LedgerError::Persistence` on connectivity loss or
    /// constraint violation (empty display name or kit).
    async fn create_player(
        &self,
        display_name: &str,
        kit: &str,
        initial_rating: f64,
    ) -> crate::error::Result<PlayerId>;

    /// Fetch a single player record
    ///
    /// Fails with `LedgerError::PlayerNotFound` when no record has that id.
    async fn get_player(&self, id: PlayerId) -> crate::error::Result<Player>;

    /// All players in a kit, descending by rating; empty when none match
    async fn list_by_kit(&self, kit: &str) -> crate::error::Result<Vec<Player>>;

    /// Mean rating over the given scope
    ///
    /// Fails with `LedgerError::NoData` when the scope holds no records;
    /// the caller decides the fallback.
    async fn average_rating(&self, scope: RatingScope) -> crate::error::Result<f64>;

    /// Commit both sides of a match as one atomic unit
    ///
    /// Each update applies `rating = new_rating, matches = expected_matches + 1`
    /// only while the stored counter still equals `expected_matches`. A stale
    /// guard or missing row aborts the whole pair with
    /// `LedgerError::UpdateConflict` and neither side is modified; callers
    /// re-read and retry.
    async fn apply_match(
        &self,
        winner: &RatingUpdate,
        loser: &RatingUpdate,
    ) -> crate::error::Result<()>;
}
