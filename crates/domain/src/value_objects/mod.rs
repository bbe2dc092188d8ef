//! Value objects - Immutable objects defined by their attributes

mod dice;
mod risk;

pub use dice::{
    add_die_to_expression, DiceExpression, DiceExpressionError, DiceTerm, RollResult, TermRoll,
    MAX_DIE_SIDES, MAX_TOTAL_DICE,
};
pub use risk::RiskLevel;
