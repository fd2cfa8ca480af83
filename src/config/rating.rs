//! Rating system configuration

use serde::{Deserialize, Serialize};

/// Tunables for the Elo computation and its update loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Starting rating for new registrations. The sentinel 0.0 means
    /// "derive from the current league-wide average" instead.
    pub default_rating: f64,
    /// Magnitude of each rating adjustment
    pub k_factor: f64,
    /// A player with `matches <= threshold` is still provisional
    pub provisional_match_threshold: i64,
    /// Bound on optimistic-conflict retries in `record_match`
    pub max_update_attempts: u32,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            default_rating: 1200.0,
            k_factor: 24.0,
            provisional_match_threshold: 10,
            max_update_attempts: 5,
        }
    }
}

impl RatingSettings {
    /// Whether new registrations should be seeded from the league average
    pub fn derives_default_from_average(&self) -> bool {
        self.default_rating == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rating_sentinel() {
        let mut settings = RatingSettings::default();
        assert!(!settings.derives_default_from_average());

        settings.default_rating = 0.0;
        assert!(settings.derives_default_from_average());
    }
}
