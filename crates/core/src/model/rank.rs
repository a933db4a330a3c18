use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived label for a final percentage, from best to worst.
///
/// Thresholds: Scholar ≥ 90, Champion 80–89, Ambassador 70–79,
/// Explorer 60–69, Learner 50–59, Beginner < 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RankTier {
    Scholar,
    Champion,
    Ambassador,
    Explorer,
    Learner,
    Beginner,
}

impl RankTier {
    /// All tiers in descending order, with their minimum percentage.
    pub const LADDER: [(RankTier, u32); 6] = [
        (RankTier::Scholar, 90),
        (RankTier::Champion, 80),
        (RankTier::Ambassador, 70),
        (RankTier::Explorer, 60),
        (RankTier::Learner, 50),
        (RankTier::Beginner, 0),
    ];

    /// Classify `score` out of `total`.
    ///
    /// Compares the exact ratio against each threshold, so 89.5% is still a
    /// Champion even though it displays as 90%. A zero total ranks as Beginner.
    #[must_use]
    pub fn from_score(score: u32, total: u32) -> Self {
        if total == 0 {
            return RankTier::Beginner;
        }
        let scaled = u64::from(score) * 100;
        Self::LADDER
            .iter()
            .find(|(_, min)| scaled >= u64::from(*min) * u64::from(total))
            .map_or(RankTier::Beginner, |(tier, _)| *tier)
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            RankTier::Scholar => "Health Scholar",
            RankTier::Champion => "Health Champion",
            RankTier::Ambassador => "Health Ambassador",
            RankTier::Explorer => "Health Explorer",
            RankTier::Learner => "Health Learner",
            RankTier::Beginner => "Health Beginner",
        }
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            RankTier::Scholar => "🏆",
            RankTier::Champion => "🥇",
            RankTier::Ambassador => "🥈",
            RankTier::Explorer => "🥉",
            RankTier::Learner => "📚",
            RankTier::Beginner => "🌱",
        }
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Percentage of `score` over `total`, rounded half up. Zero when `total` is zero.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score);
    let total = u64::from(total);
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(RankTier::from_score(10, 10), RankTier::Scholar);
        assert_eq!(RankTier::from_score(9, 10), RankTier::Scholar);
        assert_eq!(RankTier::from_score(8, 10), RankTier::Champion);
        assert_eq!(RankTier::from_score(7, 10), RankTier::Ambassador);
        assert_eq!(RankTier::from_score(6, 10), RankTier::Explorer);
        assert_eq!(RankTier::from_score(5, 10), RankTier::Learner);
        assert_eq!(RankTier::from_score(4, 10), RankTier::Beginner);
        assert_eq!(RankTier::from_score(0, 10), RankTier::Beginner);
    }

    #[test]
    fn tier_uses_exact_ratio() {
        // 179/200 = 89.5%
        assert_eq!(RankTier::from_score(179, 200), RankTier::Champion);
        assert_eq!(percentage(179, 200), 90);
    }

    #[test]
    fn zero_total_is_beginner() {
        assert_eq!(RankTier::from_score(0, 0), RankTier::Beginner);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
    }
}
