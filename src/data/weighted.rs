//! Weighted random tables
//!
//! Cumulative-weight sampler used for encounter tables, container loot and
//! floor definition selection.

use rand::Rng;

use crate::error::DungeonError;
use crate::world::Range;

/// Bernoulli trial; probabilities outside `[0, 1]` are clamped
pub fn roll_chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

/// How many of an item a table entry yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    Fixed(u32),
    Between(Range),
}

impl Amount {
    /// Resolve to a concrete count, sampling uniformly for ranges
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match self {
            Amount::Fixed(n) => *n,
            Amount::Between(range) => range.sample(rng),
        }
    }
}

impl From<u32> for Amount {
    fn from(n: u32) -> Self {
        Amount::Fixed(n)
    }
}

impl From<Range> for Amount {
    fn from(range: Range) -> Self {
        Amount::Between(range)
    }
}

/// A single table entry
#[derive(Debug, Clone)]
pub struct WeightedEntry<T> {
    pub item: T,
    pub amount: Amount,
    pub weight: f64,
}

/// Result of rolling a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roll<'a, T> {
    pub item: &'a T,
    pub amount: u32,
}

/// Weighted random sampler over entries with optional ranged amounts
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<WeightedEntry<T>>,
    total_weight: f64,
}

impl<T> Default for WeightedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeightedTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            total_weight: 0.0,
        }
    }

    /// Add an entry yielding exactly one of `item`
    pub fn with(self, item: T, weight: f64) -> Self {
        self.with_amount(item, Amount::Fixed(1), weight)
    }

    /// Add an entry with an explicit amount
    pub fn with_amount(mut self, item: T, amount: impl Into<Amount>, weight: f64) -> Self {
        self.push(item, amount, weight);
        self
    }

    /// Add an entry in place. Entries whose weight is not a positive finite
    /// number are dropped.
    pub fn push(&mut self, item: T, amount: impl Into<Amount>, weight: f64) {
        if !weight.is_finite() || weight <= 0.0 {
            return;
        }
        self.total_weight += weight;
        self.entries.push(WeightedEntry {
            item,
            amount: amount.into(),
            weight,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Draw one entry proportionally to its weight and resolve its amount
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Roll<'_, T>, DungeonError> {
        let last = self.entries.last().ok_or(DungeonError::EmptyTable)?;

        let target = rng.gen_range(0.0..self.total_weight);
        let mut upper = 0.0;
        for entry in &self.entries {
            upper += entry.weight;
            if target < upper {
                return Ok(Roll {
                    item: &entry.item,
                    amount: entry.amount.resolve(rng),
                });
            }
        }

        // Float accumulation can land a hair short of the total
        Ok(Roll {
            item: &last.item,
            amount: last.amount.resolve(rng),
        })
    }
}
