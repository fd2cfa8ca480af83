//! Elo expected-score and delta math
//!
//! Pure functions, no I/O. The numbers produced here are load-bearing:
//! deployed ratings depend on the exact values, so the formulas reproduce
//! the historical behavior bit-for-bit (see `expected_score`).

/// Expected score pair for two ratings; always sums to 1.0
///
/// The exponent `rating / 400` is truncated toward zero to a whole number
/// before raising ten to it, giving a step function over 400-point bands
/// instead of the textbook continuous logistic curve. Historical ratings
/// were produced by this step function, so it stays.
pub fn expected_score(rating_a: f64, rating_b: f64) -> (f64, f64) {
    let base_a = 10f64.powi((rating_a / 400.0) as i32);
    let base_b = 10f64.powi((rating_b / 400.0) as i32);
    let total = base_a + base_b;
    (base_a / total, base_b / total)
}

/// Rating deltas for the winner and loser of a match
///
/// Draws score both sides 0.5. When exactly one side is provisional, the
/// established side's weight drops to zero, and each weight gates the
/// *opposite* side's delta: a provisional win moves only the provisional
/// player's rating, and an established player never bleeds points to a
/// provisional one.
pub fn find_deltas(
    winner_rating: f64,
    loser_rating: f64,
    draw: bool,
    winner_provisional: bool,
    loser_provisional: bool,
    k_factor: f64,
) -> (f64, f64) {
    let (actual_winner, actual_loser) = if draw { (0.5, 0.5) } else { (1.0, 0.0) };

    let mut winner_weight = 1.0;
    let mut loser_weight = 1.0;
    if winner_provisional != loser_provisional {
        if winner_provisional {
            winner_weight = 0.0;
        } else {
            loser_weight = 0.0;
        }
    }

    let (expected_winner, expected_loser) = expected_score(winner_rating, loser_rating);

    let winner_delta = k_factor * loser_weight * (actual_winner - expected_winner);
    let loser_delta = k_factor * winner_weight * (actual_loser - expected_loser);
    (winner_delta, loser_delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_equal_ratings_split_evenly() {
        let (a, b) = expected_score(1200.0, 1200.0);
        assert_eq!((a, b), (0.5, 0.5));
    }

    #[test]
    fn test_truncated_exponent_steps() {
        // 1399 and 1200 sit in the same 400-point band: both truncate to
        // exponent 3, so the matchup is treated as even.
        let (a, b) = expected_score(1399.0, 1200.0);
        assert_eq!((a, b), (0.5, 0.5));

        // 1600 crosses into the next band: 10^4 vs 10^3.
        let (a, b) = expected_score(1600.0, 1200.0);
        assert!((a - 10_000.0 / 11_000.0).abs() < EPSILON);
        assert!((b - 1_000.0 / 11_000.0).abs() < EPSILON);
    }

    #[test]
    fn test_negative_ratings_truncate_toward_zero() {
        // -100/400 truncates to 0, same as 100/400: even matchup.
        let (a, b) = expected_score(-100.0, 100.0);
        assert_eq!((a, b), (0.5, 0.5));
    }

    #[test]
    fn test_even_match_deltas() {
        let (wd, ld) = find_deltas(1200.0, 1200.0, false, true, true, 24.0);
        assert!((wd - 12.0).abs() < EPSILON);
        assert!((ld + 12.0).abs() < EPSILON);
    }

    #[test]
    fn test_draw_between_even_players_moves_nothing() {
        let (wd, ld) = find_deltas(1200.0, 1200.0, true, false, false, 24.0);
        assert!(wd.abs() < EPSILON);
        assert!(ld.abs() < EPSILON);
    }

    #[test]
    fn test_provisional_winner_leaves_established_loser_unmoved() {
        let (wd, ld) = find_deltas(1200.0, 1300.0, false, true, false, 24.0);
        assert_eq!(ld, 0.0);
        assert!(wd > 0.0);
    }

    #[test]
    fn test_provisional_loser_gives_established_winner_nothing() {
        let (wd, ld) = find_deltas(1300.0, 1200.0, false, false, true, 24.0);
        assert_eq!(wd, 0.0);
        assert!(ld <= 0.0);
    }

    #[test]
    fn test_both_provisional_plays_straight() {
        let (wd, ld) = find_deltas(1200.0, 1200.0, false, true, true, 32.0);
        assert!((wd - 16.0).abs() < EPSILON);
        assert!((ld + 16.0).abs() < EPSILON);
    }

    proptest! {
        #[test]
        fn prop_self_match_is_even(rating in -3000.0..3000.0f64) {
            let (a, b) = expected_score(rating, rating);
            prop_assert_eq!((a, b), (0.5, 0.5));
        }

        #[test]
        fn prop_expected_scores_sum_to_one(
            a in -3000.0..3000.0f64,
            b in -3000.0..3000.0f64,
        ) {
            let (ea, eb) = expected_score(a, b);
            prop_assert!((ea + eb - 1.0).abs() < EPSILON);
            prop_assert!(ea >= 0.0 && ea <= 1.0);
        }

        #[test]
        fn prop_underdog_victory_pays_out(
            winner in 0.0..3000.0f64,
            loser in 0.0..3000.0f64,
            k in 1.0..64.0f64,
        ) {
            // Winner rated at or below the loser, both established, no draw:
            // winner gains, loser pays.
            prop_assume!(winner <= loser);
            let (wd, ld) = find_deltas(winner, loser, false, false, false, k);
            prop_assert!(wd >= 0.0);
            prop_assert!(ld <= 0.0);
        }

        #[test]
        fn prop_mixed_provisional_gating(
            winner in 0.0..3000.0f64,
            loser in 0.0..3000.0f64,
            draw in proptest::bool::ANY,
            k in 1.0..64.0f64,
        ) {
            let (wd, _) = find_deltas(winner, loser, draw, false, true, k);
            prop_assert_eq!(wd, 0.0);

            let (_, ld) = find_deltas(winner, loser, draw, true, false, k);
            prop_assert_eq!(ld, 0.0);
        }
    }
}
