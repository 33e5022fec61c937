//! Access pattern classification.

use serde::{Deserialize, Serialize};

/// Categorical access bucket derived from the monthly access count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPatternType {
    /// 60 or more accesses in the last 30 days.
    Frequent,
    /// 20 - 59 accesses.
    Regular,
    /// 5 - 19 accesses.
    Occasional,
    /// 1 - 4 accesses.
    Rare,
    /// No access in the last 30 days.
    Archived,
}

impl AccessPatternType {
    /// Classify a monthly access count.
    pub fn from_monthly_count(monthly: u64) -> Self {
        match monthly {
            60.. => Self::Frequent,
            20..=59 => Self::Regular,
            5..=19 => Self::Occasional,
            1..=4 => Self::Rare,
            0 => Self::Archived,
        }
    }

    /// Whether documents of this class belong close to the entrance.
    pub fn prefers_proximity(&self) -> bool {
        matches!(self, Self::Frequent | Self::Regular)
    }

    /// Whether documents of this class should free up prime space.
    pub fn prefers_remoteness(&self) -> bool {
        matches!(self, Self::Rare | Self::Archived)
    }

    /// Return the class as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frequent => "frequent",
            Self::Regular => "regular",
            Self::Occasional => "occasional",
            Self::Rare => "rare",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for AccessPatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
