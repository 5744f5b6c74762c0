use serde::{Deserialize, Serialize};

use super::GroupId;

/// Ordinal health tier derived from a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreTier {
    Strong,
    Good,
    Weak,
    Critical,
    #[serde(rename = "No data")]
    NoData,
}

impl ScoreTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => ScoreTier::Strong,
            50..=74 => ScoreTier::Good,
            25..=49 => ScoreTier::Weak,
            1..=24 => ScoreTier::Critical,
            0 => ScoreTier::NoData,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Strong => "Strong",
            ScoreTier::Good => "Good",
            ScoreTier::Weak => "Weak",
            ScoreTier::Critical => "Critical",
            ScoreTier::NoData => "No data",
        }
    }

    /// Colour hint for badges.
    pub fn tone(&self) -> &'static str {
        match self {
            ScoreTier::Strong => "green",
            ScoreTier::Good => "blue",
            ScoreTier::Weak => "yellow",
            ScoreTier::Critical => "red",
            ScoreTier::NoData => "muted",
        }
    }
}

impl std::fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Relationship health: the weighted score plus the three sub-scores that
/// explain it. Recomputed on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub label: ScoreTier,
    pub recency: u8,
    pub frequency: u8,
    pub variety: u8,
}

impl ScoreResult {
    pub const NO_DATA: ScoreResult = ScoreResult {
        score: 0,
        label: ScoreTier::NoData,
        recency: 0,
        frequency: 0,
        variety: 0,
    };

    pub fn tone(&self) -> &'static str {
        self.label.tone()
    }
}

impl Default for ScoreResult {
    fn default() -> Self {
        Self::NO_DATA
    }
}

/// Which signal a group score was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Direct,
    /// Inferred from member and family activity, dampened.
    Fallback,
    None,
}

/// A group's score together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupScore {
    pub group_id: GroupId,
    pub name: String,
    pub source: ScoreSource,
    pub score: ScoreResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ScoreTier::from_score(100), ScoreTier::Strong);
        assert_eq!(ScoreTier::from_score(75), ScoreTier::Strong);
        assert_eq!(ScoreTier::from_score(74), ScoreTier::Good);
        assert_eq!(ScoreTier::from_score(50), ScoreTier::Good);
        assert_eq!(ScoreTier::from_score(49), ScoreTier::Weak);
        assert_eq!(ScoreTier::from_score(25), ScoreTier::Weak);
        assert_eq!(ScoreTier::from_score(24), ScoreTier::Critical);
        assert_eq!(ScoreTier::from_score(1), ScoreTier::Critical);
        assert_eq!(ScoreTier::from_score(0), ScoreTier::NoData);
    }

    #[test]
    fn test_tier_serializes_as_label() {
        let json = serde_json::to_string(&ScoreTier::NoData).unwrap();
        assert_eq!(json, "\"No data\"");
        let json = serde_json::to_string(&ScoreTier::Strong).unwrap();
        assert_eq!(json, "\"Strong\"");
    }

    #[test]
    fn test_no_data_default() {
        let result = ScoreResult::default();
        assert_eq!(result, ScoreResult::NO_DATA);
        assert_eq!(result.tone(), "muted");
    }
}
