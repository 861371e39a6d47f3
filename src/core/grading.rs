//! Grade-band classification relative to a subject's full mark.

use crate::domain::model::{Level, ScoreEntry};
use serde::{Deserialize, Serialize};

// 邊界乘積 (如 0.6 * 150) 的捨入誤差，以 ULP 計
const BOUNDARY_ULPS: f64 = 4.0;

/// Band boundaries as fractions of the full mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeThresholds {
    pub excellent: f64,
    pub good: f64,
    pub passing: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.9,
            good: 0.8,
            passing: 0.6,
        }
    }
}

impl GradeThresholds {
    /// A score sitting exactly on a boundary belongs to the higher band.
    pub fn classify(&self, score: f64, full_mark: u32) -> Level {
        let full = f64::from(full_mark);
        let reaches = |ratio: f64| {
            let bound = full * ratio;
            score >= bound - bound.abs() * BOUNDARY_ULPS * f64::EPSILON
        };

        if reaches(self.excellent) {
            Level::Excellent
        } else if reaches(self.good) {
            Level::Good
        } else if reaches(self.passing) {
            Level::Passing
        } else {
            Level::Failing
        }
    }

    pub fn is_ordered(&self) -> bool {
        0.0 < self.passing
            && self.passing < self.good
            && self.good < self.excellent
            && self.excellent <= 1.0
    }
}

/// Number of scores per band, indexed in [`Level::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelDistribution {
    counts: [usize; 4],
}

impl LevelDistribution {
    pub fn from_levels(levels: impl IntoIterator<Item = Level>) -> Self {
        let mut distribution = Self::default();
        for level in levels {
            distribution.counts[level.index()] += 1;
        }
        distribution
    }

    pub fn from_entries(entries: &[ScoreEntry]) -> Self {
        Self::from_levels(entries.iter().map(|e| e.level))
    }

    pub fn count(&self, level: Level) -> usize {
        self.counts[level.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Share of `level` in percent, 0 when there is nothing to count.
    pub fn percentage(&self, level: Level) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(level) as f64 * 100.0 / total as f64
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, usize)> + '_ {
        Level::ALL.iter().map(move |level| (*level, self.count(*level)))
    }
}
