//! Rating engine: registration and match recording over a rating store
//!
//! The engine is stateless apart from its store handle and settings; it can
//! be cloned cheaply and called from any number of concurrent tasks.

use crate::config::RatingSettings;
use crate::error::LedgerError;
use crate::rating::elo;
use crate::store::RatingStore;
use crate::types::{MatchReport, Player, PlayerId, RatingScope, RatingUpdate};
use std::sync::Arc;
use tracing::debug;

/// Orchestrates rating reads, delta computation, and guarded commits
#[derive(Clone)]
pub struct RatingEngine {
    store: Arc<dyn RatingStore>,
    settings: RatingSettings,
}

impl RatingEngine {
    /// Create a new engine over the given store
    pub fn new(store: Arc<dyn RatingStore>, settings: RatingSettings) -> Self {
        Self { store, settings }
    }

    /// Register a new player in a kit, with `matches = 0`
    ///
    /// With the 0.0 default-rating sentinel the starting rating is the
    /// current league-wide average; an empty ledger then surfaces `NoData`
    /// to the caller rather than guessing a number.
    pub async fn register(&self, display_name: &str, kit: &str) -> crate::error::Result<PlayerId> {
        let initial_rating = if self.settings.derives_default_from_average() {
            self.store.average_rating(RatingScope::League).await?
        } else {
            self.settings.default_rating
        };

        self.store
            .create_player(display_name, kit, initial_rating)
            .await
    }

    /// Record a head-to-head result and commit both rating updates
    ///
    /// Deltas are computed from the pre-match ratings of both sides. The
    /// commit is guarded against concurrent matches touching either
    /// participant; on conflict the whole read-compute-commit sequence is
    /// retried from fresh reads, bounded by `max_update_attempts`.
    pub async fn record_match(
        &self,
        winner_id: PlayerId,
        loser_id: PlayerId,
        draw: bool,
    ) -> crate::error::Result<MatchReport> {
        if winner_id == loser_id {
            return Err(LedgerError::InvalidMatch {
                reason: format!("player {} cannot play themselves", winner_id),
            }
            .into());
        }

        for attempt in 1..=self.settings.max_update_attempts {
            let winner = self.store.get_player(winner_id).await?;
            let loser = self.store.get_player(loser_id).await?;

            let threshold = self.settings.provisional_match_threshold;
            let (winner_delta, loser_delta) = elo::find_deltas(
                winner.rating,
                loser.rating,
                draw,
                winner.is_provisional(threshold),
                loser.is_provisional(threshold),
                self.settings.k_factor,
            );

            let report = MatchReport {
                winner_id,
                loser_id,
                draw,
                winner_old_rating: winner.rating,
                winner_new_rating: winner.rating + winner_delta,
                loser_old_rating: loser.rating,
                loser_new_rating: loser.rating + loser_delta,
            };

            let commit = self
                .store
                .apply_match(
                    &RatingUpdate {
                        id: winner_id,
                        expected_matches: winner.matches,
                        new_rating: report.winner_new_rating,
                    },
                    &RatingUpdate {
                        id: loser_id,
                        expected_matches: loser.matches,
                        new_rating: report.loser_new_rating,
                    },
                )
                .await;

            match commit {
                Ok(()) => return Ok(report),
                Err(e) if is_update_conflict(&e) => {
                    debug!(
                        "Match commit attempt {} conflicted for {} vs {}, retrying",
                        attempt, winner_id, loser_id
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(LedgerError::ConflictRetryExhausted {
            attempts: self.settings.max_update_attempts,
        }
        .into())
    }

    /// Current record for a single player
    pub async fn player(&self, id: PlayerId) -> crate::error::Result<Player> {
        self.store.get_player(id).await
    }

    /// Leaderboard for a kit, descending by rating
    pub async fn leaderboard(&self, kit: &str) -> crate::error::Result<Vec<Player>> {
        self.store.list_by_kit(kit).await
    }
}

fn is_update_conflict(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::UpdateConflict { .. })
    )
}
