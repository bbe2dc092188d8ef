//! Aggregate risk rating for an assembled weapon

use serde::{Deserialize, Serialize};

use crate::entities::CardRisk;

/// Worst-case risk across a weapon's installed cards.
///
/// This is a ceiling, not an average: one unstable component dominates the
/// perceived danger of the whole device. `None` means nothing is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

impl From<CardRisk> for RiskLevel {
    fn from(risk: CardRisk) -> Self {
        match risk {
            CardRisk::Low => Self::Low,
            CardRisk::Medium => Self::Medium,
            CardRisk::High => Self::High,
        }
    }
}

impl RiskLevel {
    /// Fold the risks of installed cards into the aggregate rating
    pub fn aggregate(risks: impl IntoIterator<Item = CardRisk>) -> Self {
        risks
            .into_iter()
            .map(Self::from)
            .max()
            .unwrap_or(Self::None)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_is_a_ceiling() {
        let risks = [
            CardRisk::Low,
            CardRisk::Low,
            CardRisk::High,
            CardRisk::Low,
        ];
        assert_eq!(RiskLevel::aggregate(risks), RiskLevel::High);
    }

    #[test]
    fn test_aggregate_medium_dominates_low() {
        let risks = [CardRisk::Low, CardRisk::Medium];
        assert_eq!(RiskLevel::aggregate(risks), RiskLevel::Medium);
    }

    #[test]
    fn test_aggregate_empty_is_none() {
        assert_eq!(RiskLevel::aggregate([]), RiskLevel::None);
    }
}
