//! Discrete probability distributions over non-negative damage amounts.
//!
//! Scoring works on the whole outcome distribution of an action rather than
//! on a single mean, so kill probabilities and HP-capped damage come out right.

use std::collections::BTreeMap;

use crate::action::DiceExpr;

/// Probability mass function over non-negative integers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pmf {
    probs: BTreeMap<u32, f64>,
}

impl Pmf {
    /// Certain value.
    pub fn point(value: u32) -> Self {
        let mut probs = BTreeMap::new();
        probs.insert(value, 1.0);
        Self { probs }
    }

    /// Uniform distribution of one die.
    pub fn die(sides: u8) -> Self {
        let p = 1.0 / sides.max(1) as f64;
        Self {
            probs: (1..=sides.max(1) as u32).map(|v| (v, p)).collect(),
        }
    }

    /// Distribution of a dice expression, floored at zero.
    pub fn from_dice(dice: DiceExpr) -> Self {
        let mut dist = Self::point(0);
        if dice.sides > 0 {
            let die = Self::die(dice.sides);
            for _ in 0..dice.count {
                dist = dist.convolve(&die);
            }
        }
        dist.shift(dice.bonus)
    }

    /// Sum of two independent variables.
    pub fn convolve(&self, other: &Pmf) -> Pmf {
        let mut probs = BTreeMap::new();
        for (&a, &pa) in &self.probs {
            for (&b, &pb) in &other.probs {
                *probs.entry(a + b).or_insert(0.0) += pa * pb;
            }
        }
        Pmf { probs }
    }

    /// Adds a constant; results below zero collapse onto zero.
    pub fn shift(&self, delta: i32) -> Pmf {
        let mut probs = BTreeMap::new();
        for (&v, &p) in &self.probs {
            let shifted = (v as i64 + delta as i64).max(0) as u32;
            *probs.entry(shifted).or_insert(0.0) += p;
        }
        Pmf { probs }
    }

    /// Maps every value through `f`, merging equal results.
    pub fn map(&self, f: impl Fn(u32) -> u32) -> Pmf {
        let mut probs = BTreeMap::new();
        for (&v, &p) in &self.probs {
            *probs.entry(f(v)).or_insert(0.0) += p;
        }
        Pmf { probs }
    }

    /// Weighted mixture: `Σ weight_i × dist_i`. Weights should sum to 1.
    pub fn mixture<'a>(parts: impl IntoIterator<Item = (f64, &'a Pmf)>) -> Pmf {
        let mut probs = BTreeMap::new();
        for (weight, dist) in parts {
            if weight <= 0.0 {
                continue;
            }
            for (&v, &p) in &dist.probs {
                *probs.entry(v).or_insert(0.0) += weight * p;
            }
        }
        Pmf { probs }
    }

    pub fn expected(&self) -> f64 {
        self.probs.iter().map(|(&v, &p)| v as f64 * p).sum()
    }

    /// Expected value of `min(X, cap)`.
    pub fn expected_capped(&self, cap: u32) -> f64 {
        self.probs.iter().map(|(&v, &p)| v.min(cap) as f64 * p).sum()
    }

    /// `P(X >= threshold)`.
    pub fn prob_at_least(&self, threshold: u32) -> f64 {
        self.probs.range(threshold..).map(|(_, &p)| p).sum()
    }

    /// Total probability mass (1.0 for a normalized distribution).
    pub fn total(&self) -> f64 {
        self.probs.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.probs.iter().map(|(&v, &p)| (v, p))
    }
}
