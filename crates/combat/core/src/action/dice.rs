//! Dice expressions such as `2d6+3`.

use std::fmt;
use std::str::FromStr;

use crate::env::RngOracle;

/// `count`d`sides` + `bonus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct DiceExpr {
    pub count: u8,
    pub sides: u8,
    pub bonus: i32,
}

/// Errors that can occur while parsing a dice expression.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceParseError {
    #[error("empty dice expression")]
    Empty,

    #[error("invalid number '{0}' in dice expression")]
    InvalidNumber(String),

    #[error("dice must have at least 2 sides (got {0})")]
    InvalidSides(u8),
}

impl DiceExpr {
    pub const fn new(count: u8, sides: u8, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    /// A fixed amount with no dice.
    pub const fn flat(bonus: i32) -> Self {
        Self::new(0, 0, bonus)
    }

    pub fn min(&self) -> i32 {
        self.count as i32 + self.bonus
    }

    pub fn max(&self) -> i32 {
        self.count as i32 * self.sides as i32 + self.bonus
    }

    pub fn average(&self) -> f64 {
        self.count as f64 * (self.sides as f64 + 1.0) / 2.0 + self.bonus as f64
    }

    /// Same expression with the dice doubled (critical hit).
    pub fn doubled_dice(&self) -> Self {
        Self::new(self.count.saturating_mul(2), self.sides, self.bonus)
    }

    /// Rolls the expression. `seed_for(i)` yields the seed for the i-th die.
    ///
    /// # Returns
    ///
    /// The total, floored at zero.
    pub fn roll<R>(&self, rng: &R, mut seed_for: impl FnMut(u32) -> u64) -> u32
    where
        R: RngOracle + ?Sized,
    {
        let mut total = self.bonus;
        if self.sides > 0 {
            for die in 0..self.count as u32 {
                total += rng.roll_die(seed_for(die), self.sides as u32) as i32;
            }
        }
        total.max(0) as u32
    }
}

impl FromStr for DiceExpr {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let number = |text: &str| -> Result<i32, DiceParseError> {
            text.parse::<i32>()
                .map_err(|_| DiceParseError::InvalidNumber(text.to_string()))
        };

        let Some((count, rest)) = compact.split_once('d') else {
            return Ok(Self::flat(number(&compact)?));
        };

        let count = if count.is_empty() { 1 } else { number(count)? };
        let (sides, bonus) = match rest.find(['+', '-']) {
            Some(index) => (&rest[..index], number(&rest[index..])?),
            None => (rest, 0),
        };
        let sides = number(sides)?;

        let count = u8::try_from(count).map_err(|_| DiceParseError::InvalidNumber(count.to_string()))?;
        let sides = u8::try_from(sides).map_err(|_| DiceParseError::InvalidNumber(sides.to_string()))?;
        if sides < 2 {
            return Err(DiceParseError::InvalidSides(sides));
        }

        Ok(Self::new(count, sides, bonus))
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(value: DiceExpr) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 || self.sides == 0 {
            return write!(f, "{}", self.bonus);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{}", b),
            b => write!(f, "{}", b),
        }
    }
}
