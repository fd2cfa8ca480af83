//! In-memory rating store
//!
//! Backing store for tests and single-process embedded use. Mirrors the
//! guarded-update semantics of the Postgres store so engine behavior is
//! identical against either.

use crate::error::LedgerError;
use crate::store::RatingStore;
use crate::types::{Player, PlayerId, RatingScope, RatingUpdate};
use crate::utils::{current_timestamp, generate_player_id};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory rating store implementation
#[derive(Debug, Default)]
pub struct InMemoryStore {
    players: RwLock<HashMap<PlayerId, Player>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of player records (for tests and diagnostics)
    pub fn player_count(&self) -> crate::error::Result<usize> {
        let players = self.players.read().map_err(|_| LedgerError::Persistence {
            message: "Failed to acquire players read lock".to_string(),
        })?;

        Ok(players.len())
    }
}

#[async_trait]
impl RatingStore for InMemoryStore {
    async fn create_player(
        &self,
        display_name: &str,
        kit: &str,
        initial_rating: f64,
    ) -> crate::error::Result<PlayerId> {
        if display_name.is_empty() {
            return Err(LedgerError::Persistence {
                message: "display_name cannot be empty".to_string(),
            }
            .into());
        }
        if kit.is_empty() {
            return Err(LedgerError::Persistence {
                message: "kit cannot be empty".to_string(),
            }
            .into());
        }

        let mut players = self.players.write().map_err(|_| LedgerError::Persistence {
            message: "Failed to acquire players write lock".to_string(),
        })?;

        let id = generate_player_id();
        let now = current_timestamp();
        players.insert(
            id,
            Player {
                id,
                display_name: display_name.to_string(),
                kit: kit.to_string(),
                matches: 0,
                rating: initial_rating,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn get_player(&self, id: PlayerId) -> crate::error::Result<Player> {
        let players = self.players.read().map_err(|_| LedgerError::Persistence {
            message: "Failed to acquire players read lock".to_string(),
        })?;

        players
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                LedgerError::PlayerNotFound {
                    player_id: id.to_string(),
                }
                .into()
            })
    }

    async fn list_by_kit(&self, kit: &str) -> crate::error::Result<Vec<Player>> {
        let players = self.players.read().map_err(|_| LedgerError::Persistence {
            message: "Failed to acquire players read lock".to_string(),
        })?;

        let mut matching: Vec<Player> = players
            .values()
            .filter(|player| player.kit == kit)
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(matching)
    }

    async fn average_rating(&self, scope: RatingScope) -> crate::error::Result<f64> {
        let players = self.players.read().map_err(|_| LedgerError::Persistence {
            message: "Failed to acquire players read lock".to_string(),
        })?;

        let ratings: Vec<f64> = players
            .values()
            .filter(|player| match &scope {
                RatingScope::League => true,
                RatingScope::Kit(kit) => &player.kit == kit,
            })
            .map(|player| player.rating)
            .collect();

        if ratings.is_empty() {
            return Err(LedgerError::NoData {
                scope: scope.to_string(),
            }
            .into());
        }

        Ok(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }

    async fn apply_match(
        &self,
        winner: &RatingUpdate,
        loser: &RatingUpdate,
    ) -> crate::error::Result<()> {
        let mut players = self.players.write().map_err(|_| LedgerError::Persistence {
            message: "Failed to acquire players write lock".to_string(),
        })?;

        // Validate both guards before touching either row so a stale side
        // leaves the pair untouched.
        for update in [winner, loser] {
            match players.get(&update.id) {
                Some(player) if player.matches == update.expected_matches => {}
                _ => {
                    return Err(LedgerError::UpdateConflict {
                        player_id: update.id.to_string(),
                    }
                    .into());
                }
            }
        }

        let now = current_timestamp();
        for update in [winner, loser] {
            let player = players
                .get_mut(&update.id)
                .ok_or_else(|| LedgerError::Persistence {
                    message: format!("Player {} vanished mid-update", update.id),
                })?;
            player.rating = update.new_rating;
            player.matches = update.expected_matches + 1;
            player.updated_at = now;
        }

        Ok(())
    }
}
