//! Common types used throughout the rating ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = Uuid;

/// Reference vocabulary of kits (equipment categories). Stores accept any
/// non-empty string; this list is what the league actually runs.
pub mod kits {
    pub const ARCHERY: &str = "Archery";
    pub const SINGLE_BLUE: &str = "SingleBlue";
    pub const FLORENTINE: &str = "Florentine";
    pub const SINGLE_RED: &str = "SingleRed";
    pub const SWORD_AND_BOARD: &str = "SwordAndBoard";
    pub const SWORD_AND_STAFF: &str = "SwordAndStaff";
    pub const SINGLE_SPEAR: &str = "SingleSpear";

    pub const ALL: [&str; 7] = [
        ARCHERY,
        SINGLE_BLUE,
        FLORENTINE,
        SINGLE_RED,
        SWORD_AND_BOARD,
        SWORD_AND_STAFF,
        SINGLE_SPEAR,
    ];
}

/// A persisted player rating record, one per (player, kit)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub kit: String,
    /// Matches recorded with this player on either side; never decremented
    pub matches: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Whether this player is still provisional under the given threshold
    pub fn is_provisional(&self, threshold: i64) -> bool {
        self.matches <= threshold
    }
}

/// Scope for average-rating queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingScope {
    /// Every record regardless of kit (used to seed new registrations)
    League,
    /// A single kit
    Kit(String),
}

impl std::fmt::Display for RatingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingScope::League => write!(f, "league"),
            RatingScope::Kit(kit) => write!(f, "kit:{}", kit),
        }
    }
}

/// Guarded single-row rating update: applies only while the stored match
/// counter still equals `expected_matches`
#[derive(Debug, Clone, PartialEq)]
pub struct RatingUpdate {
    pub id: PlayerId,
    pub expected_matches: i64,
    pub new_rating: f64,
}

/// Outcome of a committed match, returned to callers for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub draw: bool,
    pub winner_old_rating: f64,
    pub winner_new_rating: f64,
    pub loser_old_rating: f64,
    pub loser_new_rating: f64,
}

impl MatchReport {
    pub fn winner_delta(&self) -> f64 {
        self.winner_new_rating - self.winner_old_rating
    }

    pub fn loser_delta(&self) -> f64 {
        self.loser_new_rating - self.loser_old_rating
    }
}
