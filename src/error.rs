//! Error types for the rating ledger
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ledger scenarios
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Invalid match: {reason}")]
    InvalidMatch { reason: String },

    #[error("No rating data available for scope: {scope}")]
    NoData { scope: String },

    #[error("Persistence failure: {message}")]
    Persistence { message: String },

    #[error("Concurrent update conflict on player: {player_id}")]
    UpdateConflict { player_id: String },

    #[error("Match update still conflicted after {attempts} attempts")]
    ConflictRetryExhausted { attempts: u32 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = LedgerError::PlayerNotFound {
            player_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Player not found: abc");

        let err = LedgerError::ConflictRetryExhausted { attempts: 5 };
        assert!(err.to_string().contains("5 attempts"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = LedgerError::InvalidMatch {
            reason: "winner and loser are the same player".to_string(),
        }
        .into();

        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::InvalidMatch { .. })
        ));
    }
}
