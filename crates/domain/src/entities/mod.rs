//! Catalog entities - immutable definitions of shells, layers, and cards

mod card;
mod layer;
mod shell;

pub use card::{BuildTime, Card, CardCost, CardMechanics, CardRequirements, CardRisk, Rarity};
pub use layer::Layer;
pub use shell::{Shell, ShellRequirements, ShellRules, ShellStats, StressLimit};
