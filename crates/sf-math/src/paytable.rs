//! Paytable: winning combinations and payout multiples

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A winning combination: an ordered sequence of symbol names
///
/// Only the first three positions are significant for probability; the
/// games draw five reels but pay on the leftmost three.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combo(Vec<String>);

impl Combo {
    /// Build from symbol names
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(symbols.into_iter().map(Into::into).collect())
    }

    /// Three-of-a-kind shorthand
    pub fn triple(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self(vec![symbol.clone(), symbol.clone(), symbol])
    }

    /// Symbol names in order
    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    /// Number of positions in the combination
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the combination empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("+"))
    }
}

/// Combination → payout multiple of the bet
///
/// The read path never mutates; retargeting produces a scaled copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayTable {
    entries: BTreeMap<Combo, f64>,
}

impl PayTable {
    /// Empty paytable
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (combo, payout) pairs
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Combo, f64)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, combo: Combo, payout: f64) {
        self.entries.insert(combo, payout);
    }

    /// Payout for a combination, if listed
    pub fn get(&self, combo: &Combo) -> Option<f64> {
        self.entries.get(combo).copied()
    }

    /// Iterate over (combo, payout) in combo order
    pub fn iter(&self) -> impl Iterator<Item = (&Combo, f64)> {
        self.entries.iter().map(|(combo, payout)| (combo, *payout))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the paytable empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy with every payout scaled by `factor`, rounded to 2 decimals
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(combo, payout)| (combo.clone(), round2(payout * factor)))
                .collect(),
        }
    }
}

/// Round to 2 decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_shorthand() {
        let combo = Combo::triple("cherry");
        assert_eq!(combo.symbols(), ["cherry", "cherry", "cherry"]);
        assert_eq!(combo.to_string(), "cherry+cherry+cherry");
    }

    #[test]
    fn test_scaled_rounds_to_two_decimals() {
        let table = PayTable::from_entries([(Combo::triple("a"), 5.0)]);
        let scaled = table.scaled(3.8874);
        assert_eq!(scaled.get(&Combo::triple("a")), Some(19.44));
    }

    #[test]
    fn test_scaled_leaves_original_untouched() {
        let table = PayTable::from_entries([(Combo::triple("a"), 5.0)]);
        let _ = table.scaled(2.0);
        assert_eq!(table.get(&Combo::triple("a")), Some(5.0));
    }
}
