//! Symbol definitions and weighted distributions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Symbol role classification
///
/// Every reel symbol is exactly one of these. Multiplier symbols carry
/// their factor explicitly instead of encoding it in the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum SymbolKind {
    /// Regular paying symbol
    Regular,
    /// Wild - pays through its own paytable row
    Wild,
    /// Bonus - triggers the free-spin round
    Bonus,
    /// Jackpot symbol - a full line pays the progressive pool
    Jackpot,
    /// Multiplier - scales a base win by `factor`
    Multiplier { factor: u32 },
}

impl SymbolKind {
    /// Multiplier factor, if this is a multiplier symbol
    pub fn multiplier_factor(&self) -> Option<u32> {
        match self {
            SymbolKind::Multiplier { factor } => Some(*factor),
            _ => None,
        }
    }
}

/// A single symbol entry: draw weight plus role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    /// Relative draw weight (probability ∝ weight / total)
    pub weight: u32,
    /// Role of the symbol
    pub kind: SymbolKind,
}

impl SymbolDef {
    /// Regular symbol with the given weight
    pub fn regular(weight: u32) -> Self {
        Self {
            weight,
            kind: SymbolKind::Regular,
        }
    }

    /// Symbol with an explicit role
    pub fn with_kind(weight: u32, kind: SymbolKind) -> Self {
        Self { weight, kind }
    }
}

/// Weighted symbol table
///
/// Ordered by name so probability listings and reports are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolSet {
    symbols: BTreeMap<String, SymbolDef>,
}

impl SymbolSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (name, def) pairs
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, SymbolDef)>,
        S: Into<String>,
    {
        Self {
            symbols: entries
                .into_iter()
                .map(|(name, def)| (name.into(), def))
                .collect(),
        }
    }

    /// Insert or replace a symbol
    pub fn insert(&mut self, name: impl Into<String>, def: SymbolDef) {
        self.symbols.insert(name.into(), def);
    }

    /// Look up a symbol definition
    pub fn get(&self, name: &str) -> Option<&SymbolDef> {
        self.symbols.get(name)
    }

    /// Does the set contain this symbol?
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over (name, def) in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolDef)> {
        self.symbols.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> u64 {
        self.symbols.values().map(|def| def.weight as u64).sum()
    }

    /// Probability of each symbol: weight / total
    ///
    /// Sums to 1.0 within floating-point tolerance. A degenerate set
    /// (empty, or total weight 0) yields an empty map; validation is
    /// expected to reject such configurations before an engine is built.
    pub fn probabilities(&self) -> BTreeMap<String, f64> {
        let total = self.total_weight();
        if total == 0 {
            return BTreeMap::new();
        }
        self.symbols
            .iter()
            .map(|(name, def)| (name.clone(), def.weight as f64 / total as f64))
            .collect()
    }

    /// The designated bonus symbol, if any
    pub fn bonus(&self) -> Option<&str> {
        self.find_kind(|kind| matches!(kind, SymbolKind::Bonus))
    }

    /// The designated wild symbol, if any
    pub fn wild(&self) -> Option<&str> {
        self.find_kind(|kind| matches!(kind, SymbolKind::Wild))
    }

    /// The designated jackpot symbol, if any
    pub fn jackpot(&self) -> Option<&str> {
        self.find_kind(|kind| matches!(kind, SymbolKind::Jackpot))
    }

    /// All multiplier symbols with their factors, in name order
    pub fn multipliers(&self) -> Vec<(&str, u32)> {
        self.symbols
            .iter()
            .filter_map(|(name, def)| {
                def.kind
                    .multiplier_factor()
                    .map(|factor| (name.as_str(), factor))
            })
            .collect()
    }

    fn find_kind(&self, pred: impl Fn(&SymbolKind) -> bool) -> Option<&str> {
        self.symbols
            .iter()
            .find(|(_, def)| pred(&def.kind))
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fruit_set() -> SymbolSet {
        SymbolSet::from_entries([
            ("cherry", SymbolDef::regular(30)),
            ("lemon", SymbolDef::regular(25)),
            ("bell", SymbolDef::regular(20)),
            ("gift", SymbolDef::with_kind(5, SymbolKind::Bonus)),
            ("joker", SymbolDef::with_kind(8, SymbolKind::Wild)),
            (
                "x2",
                SymbolDef::with_kind(5, SymbolKind::Multiplier { factor: 2 }),
            ),
            (
                "x5",
                SymbolDef::with_kind(2, SymbolKind::Multiplier { factor: 5 }),
            ),
        ])
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let set = fruit_set();
        let sum: f64 = set.probabilities().values().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_probability_is_weight_over_total() {
        let set = fruit_set();
        let probs = set.probabilities();
        let total = set.total_weight() as f64;
        assert_relative_eq!(probs["cherry"], 30.0 / total, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_set_has_no_probabilities() {
        let empty = SymbolSet::new();
        assert!(empty.probabilities().is_empty());

        let zeroed = SymbolSet::from_entries([("cherry", SymbolDef::regular(0))]);
        assert!(zeroed.probabilities().is_empty());
    }

    #[test]
    fn test_special_symbol_lookup() {
        let set = fruit_set();
        assert_eq!(set.bonus(), Some("gift"));
        assert_eq!(set.wild(), Some("joker"));
        assert_eq!(set.jackpot(), None);
        assert_eq!(set.multipliers(), vec![("x2", 2), ("x5", 5)]);
    }
}
