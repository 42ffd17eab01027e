//! Catch quality classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a pick-up is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatchOutcome {
    /// Caught above the high threshold, ground contact or not.
    Spectacular,
    /// Caught before the disc touched the ground.
    Good,
    /// Recovered after the disc touched the ground.
    Dropped,
}

/// Classifies a pick-up from the disc height at the moment of the catch and
/// whether the ground was touched since the last throw.
pub fn classify(impact_height: f32, touched_ground: bool, high_threshold: f32) -> CatchOutcome {
    if impact_height > high_threshold {
        CatchOutcome::Spectacular
    } else if !touched_ground {
        CatchOutcome::Good
    } else {
        CatchOutcome::Dropped
    }
}

impl CatchOutcome {
    /// Classification string surfaced to feedback displays.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spectacular => "spectacular",
            Self::Good => "good",
            Self::Dropped => "dropped",
        }
    }

    /// Whether the catch extends the streak.
    pub fn counts(self) -> bool {
        !matches!(self, Self::Dropped)
    }

    /// Streak value after this catch.
    pub fn next_streak(self, streak: u32) -> u32 {
        if self.counts() {
            streak.saturating_add(1)
        } else {
            0
        }
    }
}

impl fmt::Display for CatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIGH: f32 = 1.5;

    #[test]
    fn test_high_catch_is_spectacular() {
        let outcome = classify(2.0, false, HIGH);
        assert_eq!(outcome, CatchOutcome::Spectacular);
        assert_eq!(outcome.next_streak(4), 5);
    }

    #[test]
    fn test_high_catch_ignores_ground_contact() {
        assert_eq!(classify(2.0, true, HIGH), CatchOutcome::Spectacular);
    }

    #[test]
    fn test_low_clean_catch_is_good() {
        let outcome = classify(1.0, false, HIGH);
        assert_eq!(outcome, CatchOutcome::Good);
        assert_eq!(outcome.next_streak(0), 1);
    }

    #[test]
    fn test_ground_touch_drops_streak() {
        let outcome = classify(1.0, true, HIGH);
        assert_eq!(outcome, CatchOutcome::Dropped);
        assert_eq!(outcome.next_streak(7), 0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(classify(HIGH, true, HIGH), CatchOutcome::Dropped);
    }

    #[test]
    fn test_strings() {
        assert_eq!(CatchOutcome::Spectacular.to_string(), "spectacular");
        assert_eq!(CatchOutcome::Good.as_str(), "good");
        assert_eq!(CatchOutcome::Dropped.as_str(), "dropped");
    }
}
