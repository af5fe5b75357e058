//! Dice notation parsing and evaluation.
//!
//! Notation is the `[count]d<sides>[<op><operand>]` shorthand: `2d6` sums
//! two six-sided rolls, `d4+1` adds one to a single d4, `d6/2` halves a d6.
//! The count defaults to 1; the operand is a positive integer.

use std::str::FromStr;

use rand::Rng;
use rand::rngs::StdRng;

use crate::error::EngineError;

/// Arithmetic applied to a roll's sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    /// Add the operand.
    Add,
    /// Subtract the operand; the result may reach or pass zero.
    Sub,
    /// Multiply the sum by the operand.
    Mul,
    /// Divide the sum by the operand, rounding up, never below 1.
    Div,
}

/// An optional modifier on a dice notation (`+3`, `/2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier {
    /// The operator.
    pub op: MathOp,
    /// The positive integer operand.
    pub operand: i64,
}

/// A parsed dice notation, ready to roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceNotation {
    /// Number of dice to roll and sum.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
    /// Optional arithmetic modifier on the sum.
    pub modifier: Option<Modifier>,
}

impl FromStr for DiceNotation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EngineError::MalformedNotation(s.to_string());
        let trimmed = s.trim();
        let (count_part, rest) = trimmed.split_once(['d', 'D']).ok_or_else(malformed)?;

        let count = if count_part.is_empty() {
            1
        } else {
            count_part.parse::<u32>().map_err(|_| malformed())?
        };

        let op_at = rest.find(['+', '-', '*', '/']);
        let (sides_part, modifier) = match op_at {
            None => (rest, None),
            Some(at) => {
                let (sides_part, op_part) = rest.split_at(at);
                let op = match &op_part[..1] {
                    "+" => MathOp::Add,
                    "-" => MathOp::Sub,
                    "*" => MathOp::Mul,
                    _ => MathOp::Div,
                };
                let operand = op_part[1..].parse::<i64>().map_err(|_| malformed())?;
                if operand < 0 || (op == MathOp::Div && operand == 0) {
                    return Err(malformed());
                }
                (sides_part, Some(Modifier { op, operand }))
            }
        };

        let sides = sides_part.parse::<u32>().map_err(|_| malformed())?;
        if count == 0 || sides == 0 {
            return Err(malformed());
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }
}

impl std::fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if let Some(m) = self.modifier {
            let op = match m.op {
                MathOp::Add => '+',
                MathOp::Sub => '-',
                MathOp::Mul => '*',
                MathOp::Div => '/',
            };
            write!(f, "{op}{}", m.operand)?;
        }
        Ok(())
    }
}

impl DiceNotation {
    /// Roll the dice: sum `count` uniform draws in `[1, sides]` and apply
    /// the modifier. Division rounds up and never yields less than 1.
    pub fn roll(&self, rng: &mut StdRng) -> i64 {
        let mut sum: i64 = 0;
        for _ in 0..self.count {
            sum += i64::from(rng.random_range(1..=self.sides));
        }
        match self.modifier {
            None => sum,
            Some(Modifier { op, operand }) => match op {
                MathOp::Add => sum + operand,
                MathOp::Sub => sum - operand,
                MathOp::Mul => sum * operand,
                MathOp::Div => {
                    // Ceiling division; `i64::div_ceil` is unstable.
                    let q = sum.div_euclid(operand) + i64::from(sum.rem_euclid(operand) != 0);
                    q.max(1)
                }
            },
        }
    }
}
