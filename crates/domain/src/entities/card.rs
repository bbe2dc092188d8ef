//! Card entity - A concrete component installed into one weapon layer
//!
//! Cards consume slots on the shell, carry a qualitative risk rating, and
//! describe both what they do and how they fail. Immutable catalog entries.

use serde::{Deserialize, Serialize};

use crate::ids::{CardId, LayerId};

/// A concrete component belonging to exactly one layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// The layer this card can be installed into
    pub layer_id: LayerId,
    /// Campaign progression gate; cards above the current tier are unusable
    pub tier: u8,
    pub rarity: Rarity,
    pub cost: CardCost,
    pub risk: CardRisk,
    pub mechanics: CardMechanics,
    pub requirements: CardRequirements,
}

/// What installing and building this card consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCost {
    /// Slot capacity consumed on the shell
    pub slots: u32,
    #[serde(default)]
    pub materials: Vec<String>,
    pub time: BuildTime,
}

/// In-fiction behavior of the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMechanics {
    /// What the component does when it works
    pub role: String,
    /// What happens when it fails
    pub failure: String,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub effects: Vec<String>,
}

/// Skills, tools, and knowledge needed to build the card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRequirements {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub knowledge: Vec<String>,
}

/// How hard the card is to come by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    /// Unknown rarity for forward compatibility
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Common => write!(f, "common"),
            Self::Uncommon => write!(f, "uncommon"),
            Self::Rare => write!(f, "rare"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for Rarity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            _ => Ok(Self::Unknown),
        }
    }
}

/// Qualitative danger rating of a single component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardRisk {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for CardRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// How long building the card takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTime {
    Hours,
    Days,
    Weeks,
    /// Unknown duration for forward compatibility
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for BuildTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hours => write!(f, "hours"),
            Self::Days => write!(f, "days"),
            Self::Weeks => write!(f, "weeks"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for BuildTime {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            "weeks" => Ok(Self::Weeks),
            _ => Ok(Self::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_risk_ordering() {
        assert!(CardRisk::Low < CardRisk::Medium);
        assert!(CardRisk::Medium < CardRisk::High);
    }

    #[test]
    fn test_rarity_round_trip() {
        let r: Rarity = "uncommon".parse().expect("infallible");
        assert_eq!(r, Rarity::Uncommon);
        assert_eq!(r.to_string(), "uncommon");
    }

    #[test]
    fn test_unknown_rarity_is_forward_compatible() {
        let r: Rarity = "mythic".parse().expect("infallible");
        assert_eq!(r, Rarity::Unknown);
    }
}
