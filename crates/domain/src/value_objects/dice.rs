//! Dice expression value objects and parsing
//!
//! Supports multi-term expressions like "2d6+1d4+3", "1d20-5", "d100".
//! Expressions are parsed into an ordered term list plus one flat modifier;
//! rolling is driven by an injected die closure so the domain layer stays
//! free of RNG dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest number of dice a single term may request, and the cap on the
/// total across all terms of one expression.
pub const MAX_TOTAL_DICE: u64 = 50;

/// Largest die size a term may request.
pub const MAX_DIE_SIDES: u64 = 1000;

/// Error when parsing a dice expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceExpressionError {
    /// The expression string is empty
    #[error("Empty dice expression")]
    Empty,
    /// A token is neither a dice term nor an integer
    #[error("Unrecognized token: '{0}'")]
    InvalidToken(String),
    /// Dice count outside [1, 50]
    #[error("Dice count must be between 1 and {MAX_TOTAL_DICE} (got {0})")]
    CountOutOfRange(u64),
    /// Die size outside [1, 1000]
    #[error("Die size must be between 1 and {MAX_DIE_SIDES} (got {0})")]
    SidesOutOfRange(u64),
    /// A dice term followed a '-' operator
    #[error("Dice terms cannot be subtracted; only flat modifiers may be negative")]
    SubtractedDice,
    /// The expression contains only flat modifiers
    #[error("Expression contains no dice terms")]
    NoDiceTerms,
    /// The terms together request more than 50 dice
    #[error("Expression requests {0} dice; at most {MAX_TOTAL_DICE} are allowed")]
    TooManyDice(u64),
    /// Modifier value overflow
    #[error("Modifier value overflow")]
    ModifierOverflow,
}

/// One group of identical dice (X in XdY, Y in XdY)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceTerm {
    pub count: u32,
    pub sides: u32,
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// A parsed dice expression: ordered dice terms plus one flat modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceExpression {
    pub terms: Vec<DiceTerm>,
    pub modifier: i32,
}

impl DiceExpression {
    /// Parse an expression like "2d6+1d4+3" or "1d20-5".
    ///
    /// Grammar: `expr := term (('+' | '-') term)*` where a term is either
    /// `[count]d[sides]` (count defaults to 1) or a plain integer. Whitespace
    /// and case are ignored. Dice terms may only be added; integers may carry
    /// either sign and accumulate into the modifier. The parser appends one
    /// fresh term per token - merging same-sided terms is the composer's job
    /// (see [`add_die_to_expression`]).
    pub fn parse(input: &str) -> Result<Self, DiceExpressionError> {
        let normalized: String = input
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if normalized.is_empty() {
            return Err(DiceExpressionError::Empty);
        }

        let mut terms: Vec<DiceTerm> = Vec::new();
        let mut modifier: i32 = 0;
        let mut negative = false;
        let mut token = String::new();

        let mut pending: Vec<(String, bool)> = Vec::new();
        for c in normalized.chars() {
            if c == '+' || c == '-' {
                pending.push((std::mem::take(&mut token), negative));
                negative = c == '-';
            } else {
                token.push(c);
            }
        }
        pending.push((token, negative));

        for (token, negative) in pending {
            if let Some(d_pos) = token.find('d') {
                let term = Self::parse_dice_token(&token, d_pos)?;
                if negative {
                    return Err(DiceExpressionError::SubtractedDice);
                }
                terms.push(term);
            } else if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
                let value: i32 = token
                    .parse()
                    .map_err(|_| DiceExpressionError::ModifierOverflow)?;
                modifier = if negative {
                    modifier.checked_sub(value)
                } else {
                    modifier.checked_add(value)
                }
                .ok_or(DiceExpressionError::ModifierOverflow)?;
            } else {
                return Err(DiceExpressionError::InvalidToken(token));
            }
        }

        if terms.is_empty() {
            return Err(DiceExpressionError::NoDiceTerms);
        }
        let total: u64 = terms.iter().map(|t| u64::from(t.count)).sum();
        if total > MAX_TOTAL_DICE {
            return Err(DiceExpressionError::TooManyDice(total));
        }

        Ok(Self { terms, modifier })
    }

    fn parse_dice_token(token: &str, d_pos: usize) -> Result<DiceTerm, DiceExpressionError> {
        let count_str = &token[..d_pos];
        let sides_str = &token[d_pos + 1..];

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !(count_str.is_empty() || all_digits(count_str)) || !all_digits(sides_str) {
            return Err(DiceExpressionError::InvalidToken(token.to_string()));
        }

        let count: u64 = if count_str.is_empty() {
            1 // "d20" means "1d20"
        } else {
            count_str
                .parse()
                .map_err(|_| DiceExpressionError::InvalidToken(token.to_string()))?
        };
        let sides: u64 = sides_str
            .parse()
            .map_err(|_| DiceExpressionError::InvalidToken(token.to_string()))?;

        if count < 1 || count > MAX_TOTAL_DICE {
            return Err(DiceExpressionError::CountOutOfRange(count));
        }
        if sides < 1 || sides > MAX_DIE_SIDES {
            return Err(DiceExpressionError::SidesOutOfRange(sides));
        }

        Ok(DiceTerm {
            count: count as u32,
            sides: sides as u32,
        })
    }

    /// Total number of dice requested across all terms
    pub fn total_dice(&self) -> u32 {
        self.terms.iter().map(|t| t.count).sum()
    }

    /// Smallest possible total
    pub fn min_total(&self) -> i64 {
        i64::from(self.total_dice()) + i64::from(self.modifier)
    }

    /// Largest possible total
    pub fn max_total(&self) -> i64 {
        let dice: i64 = self
            .terms
            .iter()
            .map(|t| i64::from(t.count) * i64::from(t.sides))
            .sum();
        dice + i64::from(self.modifier)
    }

    /// Bump the count of the first term with matching sides, or append a
    /// fresh `1d{sides}` term. Existing terms are never reordered.
    pub fn add_die(&mut self, sides: u32) {
        if let Some(term) = self.terms.iter_mut().find(|t| t.sides == sides) {
            term.count += 1;
        } else {
            self.terms.push(DiceTerm { count: 1, sides });
        }
    }

    /// Roll the expression using the supplied die closure.
    ///
    /// `roll_die` receives the side count and must return a value in
    /// `[1, sides]`; the domain layer does not own an RNG, so production
    /// callers wire this to a random port and tests pass a fixed closure.
    pub fn roll_with<F>(&self, mut roll_die: F, now: DateTime<Utc>) -> RollResult
    where
        F: FnMut(u32) -> u32,
    {
        let mut term_rolls = Vec::with_capacity(self.terms.len());
        let mut fragments = Vec::with_capacity(self.terms.len());
        let mut dice_total: i64 = 0;

        for term in &self.terms {
            let outcomes: Vec<u32> = (0..term.count).map(|_| roll_die(term.sides)).collect();
            let subtotal: u32 = outcomes.iter().sum();
            dice_total += i64::from(subtotal);

            if term.count > 1 {
                let rolled: Vec<String> = outcomes.iter().map(|o| o.to_string()).collect();
                fragments.push(format!("{term}: [{}] = {subtotal}", rolled.join(", ")));
            } else {
                fragments.push(format!("{term}: {subtotal}"));
            }

            term_rolls.push(TermRoll {
                term: *term,
                outcomes,
                subtotal,
            });
        }

        let total = dice_total + i64::from(self.modifier);
        let mut breakdown = fragments.join(" + ");
        if self.modifier > 0 {
            breakdown.push_str(&format!(" + {}", self.modifier));
        } else if self.modifier < 0 {
            breakdown.push_str(&format!(" - {}", -i64::from(self.modifier)));
        }
        breakdown.push_str(&format!(" = {total}"));

        RollResult {
            expression: self.clone(),
            term_rolls,
            modifier: self.modifier,
            total,
            breakdown,
            rolled_at: now,
        }
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", terms.join("+"))?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        Ok(())
    }
}

/// Fold one more die into an expression under construction.
///
/// Re-parses `current`; when it parses, the first term with matching sides
/// gains one die (otherwise a new `1d{sides}` term is appended) and the whole
/// expression is re-serialized. When it does not parse, the die is appended
/// textually so the user's partial input is never destroyed.
pub fn add_die_to_expression(current: &str, sides: u32) -> String {
    match DiceExpression::parse(current) {
        Ok(mut expression) => {
            expression.add_die(sides);
            expression.to_string()
        }
        Err(_) => {
            let trimmed = current.trim();
            if trimmed.is_empty() {
                format!("1d{sides}")
            } else {
                format!("{trimmed}+1d{sides}")
            }
        }
    }
}

/// Outcome of rolling one term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRoll {
    pub term: DiceTerm,
    /// Individual die results, each in [1, sides]
    pub outcomes: Vec<u32>,
    /// Sum of this term's outcomes
    pub subtotal: u32,
}

/// Result of rolling a full expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    /// The expression that was rolled
    pub expression: DiceExpression,
    /// Per-term outcomes in expression order
    pub term_rolls: Vec<TermRoll>,
    /// Flat modifier applied after the dice
    pub modifier: i32,
    /// Sum of all subtotals plus the modifier
    pub total: i64,
    /// Human-readable breakdown, e.g. "2d6: [3, 5] = 8 + 1d4: 2 + 3 = 13"
    pub breakdown: String,
    pub rolled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_parse_simple_d20() {
        let expr = DiceExpression::parse("1d20").unwrap();
        assert_eq!(expr.terms, vec![DiceTerm { count: 1, sides: 20 }]);
        assert_eq!(expr.modifier, 0);
    }

    #[test]
    fn test_parse_shorthand_d20() {
        let expr = DiceExpression::parse("d20").unwrap();
        assert_eq!(expr.terms, vec![DiceTerm { count: 1, sides: 20 }]);
    }

    #[test]
    fn test_parse_with_positive_modifier() {
        let expr = DiceExpression::parse("2d6+3").unwrap();
        assert_eq!(expr.terms, vec![DiceTerm { count: 2, sides: 6 }]);
        assert_eq!(expr.modifier, 3);
    }

    #[test]
    fn test_parse_with_negative_modifier() {
        let expr = DiceExpression::parse("1d20-5").unwrap();
        assert_eq!(expr.modifier, -5);
    }

    #[test]
    fn test_parse_multiple_terms() {
        let expr = DiceExpression::parse("2d20+2d6+1d4+5").unwrap();
        assert_eq!(
            expr.terms,
            vec![
                DiceTerm { count: 2, sides: 20 },
                DiceTerm { count: 2, sides: 6 },
                DiceTerm { count: 1, sides: 4 },
            ]
        );
        assert_eq!(expr.modifier, 5);
    }

    #[test]
    fn test_parse_keeps_same_sided_terms_separate() {
        // Merging is the composer's job, not the parser's
        let expr = DiceExpression::parse("1d6+1d6").unwrap();
        assert_eq!(expr.terms.len(), 2);
    }

    #[test]
    fn test_parse_case_and_whitespace_insensitive() {
        let expr = DiceExpression::parse("  2D6 + 3  ").unwrap();
        assert_eq!(expr.terms, vec![DiceTerm { count: 2, sides: 6 }]);
        assert_eq!(expr.modifier, 3);
    }

    #[test]
    fn test_parse_accumulates_modifiers() {
        let expr = DiceExpression::parse("1d8+3-1+2").unwrap();
        assert_eq!(expr.modifier, 4);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(DiceExpression::parse(""), Err(DiceExpressionError::Empty));
        assert_eq!(
            DiceExpression::parse("   "),
            Err(DiceExpressionError::Empty)
        );
    }

    #[test]
    fn test_parse_subtracted_dice() {
        assert_eq!(
            DiceExpression::parse("1d6-1d4"),
            Err(DiceExpressionError::SubtractedDice)
        );
    }

    #[test]
    fn test_parse_no_dice_terms() {
        assert_eq!(
            DiceExpression::parse("5+3"),
            Err(DiceExpressionError::NoDiceTerms)
        );
    }

    #[test]
    fn test_parse_invalid_token() {
        assert_eq!(
            DiceExpression::parse("1d6+abc"),
            Err(DiceExpressionError::InvalidToken("abc".to_string()))
        );
        assert_eq!(
            DiceExpression::parse("1d2d3"),
            Err(DiceExpressionError::InvalidToken("1d2d3".to_string()))
        );
    }

    #[test]
    fn test_parse_count_out_of_range() {
        assert_eq!(
            DiceExpression::parse("0d6"),
            Err(DiceExpressionError::CountOutOfRange(0))
        );
        assert_eq!(
            DiceExpression::parse("51d6"),
            Err(DiceExpressionError::CountOutOfRange(51))
        );
    }

    #[test]
    fn test_parse_sides_out_of_range() {
        assert_eq!(
            DiceExpression::parse("1d0"),
            Err(DiceExpressionError::SidesOutOfRange(0))
        );
        assert_eq!(
            DiceExpression::parse("1d1001"),
            Err(DiceExpressionError::SidesOutOfRange(1001))
        );
    }

    #[test]
    fn test_parse_sides_one_is_allowed() {
        let expr = DiceExpression::parse("5d1").unwrap();
        assert_eq!(expr.terms, vec![DiceTerm { count: 5, sides: 1 }]);
    }

    #[test]
    fn test_total_dice_cap() {
        // 25 + 25 = 50 is allowed, one more is not
        assert!(DiceExpression::parse("25d6+25d8").is_ok());
        assert_eq!(
            DiceExpression::parse("25d6+26d8"),
            Err(DiceExpressionError::TooManyDice(51))
        );
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["1d20", "2d6+3", "1d20-5", "2d20+2d6+1d4+5"] {
            let expr = DiceExpression::parse(text).unwrap();
            assert_eq!(expr.to_string(), text);
        }
    }

    #[test]
    fn test_min_and_max_total() {
        let expr = DiceExpression::parse("2d6+3").unwrap();
        assert_eq!(expr.min_total(), 5);
        assert_eq!(expr.max_total(), 15);
    }

    #[test]
    fn test_roll_all_ones_boundary() {
        let expr = DiceExpression::parse("5d1").unwrap();
        let result = expr.roll_with(|_| 1, now());
        assert!(result.term_rolls[0].outcomes.iter().all(|&o| o == 1));
        assert_eq!(result.total, 5);
    }

    #[test]
    fn test_roll_total_equals_outcomes_plus_modifier() {
        let expr = DiceExpression::parse("2d6+1d4+3").unwrap();
        let mut next = [4u32, 5, 2].iter().copied().cycle();
        let result = expr.roll_with(|_| next.next().unwrap_or(1), now());

        let outcome_sum: i64 = result
            .term_rolls
            .iter()
            .flat_map(|t| t.outcomes.iter())
            .map(|&o| i64::from(o))
            .sum();
        assert_eq!(result.total, outcome_sum + i64::from(result.modifier));
    }

    #[test]
    fn test_roll_breakdown_format() {
        let expr = DiceExpression::parse("2d6+1d4+3").unwrap();
        let mut values = vec![2u32, 5, 2].into_iter();
        let result = expr.roll_with(|_| values.next().unwrap_or(1), now());
        assert_eq!(result.breakdown, "2d6: [2, 5] = 7 + 1d4: 2 + 3 = 12");
    }

    #[test]
    fn test_roll_breakdown_negative_modifier() {
        let expr = DiceExpression::parse("1d20-5").unwrap();
        let result = expr.roll_with(|_| 14, now());
        assert_eq!(result.breakdown, "1d20: 14 - 5 = 9");
    }

    #[test]
    fn test_roll_stays_in_range() {
        let expr = DiceExpression::parse("10d6").unwrap();
        let mut tick = 0u32;
        let result = expr.roll_with(
            |sides| {
                tick += 1;
                (tick % sides) + 1
            },
            now(),
        );
        assert!(result
            .term_rolls
            .iter()
            .flat_map(|t| t.outcomes.iter())
            .all(|&o| (1..=6).contains(&o)));
    }

    #[test]
    fn test_composer_builds_up_from_empty() {
        let step1 = add_die_to_expression("", 20);
        assert_eq!(step1, "1d20");
        let step2 = add_die_to_expression(&step1, 20);
        assert_eq!(step2, "2d20");
        let step3 = add_die_to_expression(&step2, 20);
        assert_eq!(step3, "3d20");
    }

    #[test]
    fn test_composer_appends_new_sides() {
        assert_eq!(add_die_to_expression("2d20", 6), "2d20+1d6");
        assert_eq!(add_die_to_expression("2d20+1d6", 6), "2d20+2d6");
    }

    #[test]
    fn test_composer_keeps_modifier_at_end() {
        assert_eq!(add_die_to_expression("2d20+2d6+5", 4), "2d20+2d6+1d4+5");
        assert_eq!(
            add_die_to_expression("2d20+2d6+1d4+5", 4),
            "2d20+2d6+2d4+5"
        );
    }

    #[test]
    fn test_composer_bumps_first_match_only() {
        // Parser keeps duplicate terms separate; the composer bumps the first
        assert_eq!(add_die_to_expression("1d6+1d8+1d6", 6), "2d6+1d8+1d6");
    }

    #[test]
    fn test_composer_falls_back_on_unparseable_input() {
        assert_eq!(add_die_to_expression("garbage", 8), "garbage+1d8");
    }
}
