//! RTP engine — theoretical return, house edge, retargeting, variance

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::paytable::{Combo, PayTable};
use crate::symbols::SymbolSet;

/// Reel count the games draw per spin
pub const REEL_COUNT: usize = 5;

/// Positions that pay: the leftmost three reels form the combination
pub const COMBO_LEN: usize = 3;

/// RTP difference treated as "close enough" by retargeting
pub const RTP_TOLERANCE: f64 = 0.1;

/// Free-spin round settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusSettings {
    /// Free spins awarded when the bonus symbol lands
    pub bonus_spins: u32,
    /// Win multiplier applied during the bonus round
    #[serde(default = "default_bonus_multiplier")]
    pub bonus_multiplier: f64,
}

fn default_bonus_multiplier() -> f64 {
    1.0
}

impl Default for BonusSettings {
    fn default() -> Self {
        Self {
            bonus_spins: 3,
            bonus_multiplier: 1.0,
        }
    }
}

/// Operator RTP targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RtpSettings {
    /// Target RTP percentage (accepted band: 70–99)
    pub target_rtp: f64,
    /// Declared house edge percentage
    pub house_edge: f64,
}

impl Default for RtpSettings {
    fn default() -> Self {
        Self {
            target_rtp: 94.5,
            house_edge: 5.5,
        }
    }
}

/// Payout volatility classification
///
/// Thresholds are fixed design constants, not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarianceLevel {
    Low,
    Medium,
    High,
}

impl VarianceLevel {
    /// Classify a standard deviation: <10 Low, <30 Medium, else High
    pub fn classify(std_dev: f64) -> Self {
        if std_dev < 10.0 {
            VarianceLevel::Low
        } else if std_dev < 30.0 {
            VarianceLevel::Medium
        } else {
            VarianceLevel::High
        }
    }

    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceLevel::Low => "Low",
            VarianceLevel::Medium => "Medium",
            VarianceLevel::High => "High",
        }
    }
}

impl std::fmt::Display for VarianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`RtpEngine::analyze_variance`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceAnalysis {
    /// Variance of the per-spin payout over literal paytable entries
    pub variance: f64,
    /// Standard deviation (√variance)
    pub standard_deviation: f64,
    /// Coarse volatility classification
    pub variance_level: VarianceLevel,
    /// Expected payout multiple per spin
    pub expected_value: f64,
}

/// RTP calculation engine
///
/// Pure functions over an immutable configuration snapshot. The additive
/// multiplier/bonus terms in [`theoretical_rtp`](Self::theoretical_rtp) are
/// a deliberate approximation layered on top of the 3-symbol base RTP; the
/// engine does not enumerate joint 5-reel outcomes.
#[derive(Debug, Clone)]
pub struct RtpEngine {
    symbols: SymbolSet,
    paytable: PayTable,
    bonus: BonusSettings,
    rtp: RtpSettings,
}

impl RtpEngine {
    /// Build an engine over a configuration snapshot
    pub fn new(
        symbols: SymbolSet,
        paytable: PayTable,
        bonus: BonusSettings,
        rtp: RtpSettings,
    ) -> Self {
        Self {
            symbols,
            paytable,
            bonus,
            rtp,
        }
    }

    /// The symbol set this engine was built over
    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// The paytable this engine was built over
    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    /// The bonus settings this engine was built over
    pub fn bonus_settings(&self) -> &BonusSettings {
        &self.bonus
    }

    /// The RTP targets this engine was built over
    pub fn rtp_settings(&self) -> &RtpSettings {
        &self.rtp
    }

    /// Probability of each symbol appearing on a reel
    pub fn symbol_probabilities(&self) -> BTreeMap<String, f64> {
        self.symbols.probabilities()
    }

    /// Probability of a specific combination on the three paying reels
    ///
    /// Reels are independent identical distributions, so this is the
    /// product of the first three symbols' probabilities. Combinations
    /// shorter than three symbols, or naming a symbol absent from the
    /// weight table, are unreachable and yield 0.
    pub fn combination_probability(&self, combo: &Combo) -> f64 {
        if combo.len() < COMBO_LEN {
            return 0.0;
        }

        let probabilities = self.symbol_probabilities();
        let mut total = 1.0;
        for symbol in combo.symbols().iter().take(COMBO_LEN) {
            match probabilities.get(symbol) {
                Some(p) => total *= p,
                None => return 0.0,
            }
        }
        total
    }

    /// Theoretical RTP percentage
    ///
    /// Base expected return over the paytable, plus additive expectations
    /// for multiplier symbols and the bonus round, converted to percent.
    pub fn theoretical_rtp(&self) -> f64 {
        let mut expected_return = self.average_base_win();
        expected_return += self.multiplier_bonus();
        expected_return += self.bonus_contribution();
        expected_return * 100.0
    }

    /// House edge percentage: 100 − theoretical RTP
    pub fn house_edge(&self) -> f64 {
        100.0 - self.theoretical_rtp()
    }

    /// Expected payout multiple per spin, paytable entries only
    pub fn average_base_win(&self) -> f64 {
        self.paytable
            .iter()
            .map(|(combo, payout)| self.combination_probability(combo) * payout)
            .sum()
    }

    /// Extra expected return contributed by multiplier symbols
    ///
    /// Approximation: a landed multiplier is assumed to scale a win of
    /// average size, so each contributes p · (factor − 1) · avg_base_win.
    fn multiplier_bonus(&self) -> f64 {
        let probabilities = self.symbol_probabilities();
        let avg_base_win = self.average_base_win();

        self.symbols
            .multipliers()
            .iter()
            .filter_map(|(name, factor)| {
                probabilities
                    .get(*name)
                    .map(|p| p * (*factor as f64 - 1.0) * avg_base_win)
            })
            .sum()
    }

    /// Expected return contributed by triggering the bonus round
    ///
    /// Trigger probability is at least one bonus symbol across the five
    /// reels: 1 − (1 − p)^5. Each triggered round is valued at
    /// spins · multiplier · avg_base_win.
    fn bonus_contribution(&self) -> f64 {
        let probabilities = self.symbol_probabilities();
        let Some(bonus_symbol) = self.symbols.bonus() else {
            return 0.0;
        };
        let Some(p_bonus) = probabilities.get(bonus_symbol) else {
            return 0.0;
        };

        let prob_trigger = 1.0 - (1.0 - p_bonus).powi(REEL_COUNT as i32);
        prob_trigger
            * self.bonus.bonus_spins as f64
            * self.bonus.bonus_multiplier
            * self.average_base_win()
    }

    /// Retarget the paytable toward `target_rtp`
    ///
    /// Within [`RTP_TOLERANCE`] of the current RTP the paytable is returned
    /// unchanged. Otherwise every payout is scaled by target/current and
    /// rounded to 2 decimals; symbol weights are never altered. Repeated
    /// application is only approximately idempotent because of rounding.
    pub fn adjust_rtp_to_target(&self, target_rtp: f64) -> PayTable {
        let current_rtp = self.theoretical_rtp();

        if (current_rtp - target_rtp).abs() < RTP_TOLERANCE {
            return self.paytable.clone();
        }
        if current_rtp <= 0.0 {
            log::warn!("cannot retarget a paytable with zero theoretical RTP");
            return self.paytable.clone();
        }

        let factor = target_rtp / current_rtp;
        self.paytable.scaled(factor)
    }

    /// Variance metrics over literal paytable entries
    ///
    /// Wild substitution, jackpot and bonus contributions are excluded from
    /// the expected-value and variance sums.
    pub fn analyze_variance(&self) -> VarianceAnalysis {
        let weighted: Vec<(f64, f64)> = self
            .paytable
            .iter()
            .map(|(combo, payout)| (self.combination_probability(combo), payout))
            .collect();

        let expected_value: f64 = weighted.iter().map(|(p, payout)| p * payout).sum();
        let variance: f64 = weighted
            .iter()
            .map(|(p, payout)| p * (payout - expected_value).powi(2))
            .sum();
        let standard_deviation = variance.sqrt();

        VarianceAnalysis {
            variance,
            standard_deviation,
            variance_level: VarianceLevel::classify(standard_deviation),
            expected_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{SymbolDef, SymbolKind};
    use approx::assert_relative_eq;

    /// Worked example from the tuning docs: six symbols summing to 100
    fn example_engine() -> RtpEngine {
        let symbols = SymbolSet::from_entries([
            ("A", SymbolDef::regular(30)),
            ("B", SymbolDef::regular(25)),
            ("C", SymbolDef::regular(20)),
            ("D", SymbolDef::regular(15)),
            ("E", SymbolDef::regular(7)),
            ("F", SymbolDef::regular(3)),
        ]);
        let paytable = PayTable::from_entries([
            (Combo::triple("A"), 5.0),
            (Combo::triple("B"), 7.0),
        ]);
        RtpEngine::new(
            symbols,
            paytable,
            BonusSettings::default(),
            RtpSettings::default(),
        )
    }

    #[test]
    fn test_symbol_probabilities_sum_to_one() {
        let engine = example_engine();
        let sum: f64 = engine.symbol_probabilities().values().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_combination_probability_product() {
        let engine = example_engine();
        let p = engine.combination_probability(&Combo::triple("A"));
        assert_relative_eq!(p, 0.027, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_symbol_is_unreachable() {
        let engine = example_engine();
        let p = engine.combination_probability(&Combo::new(["A", "A", "Z"]));
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_short_combination_is_unreachable() {
        let engine = example_engine();
        assert_eq!(engine.combination_probability(&Combo::new(["A", "A"])), 0.0);
        assert_eq!(engine.combination_probability(&Combo::new(Vec::<String>::new())), 0.0);
    }

    #[test]
    fn test_only_first_three_symbols_matter() {
        let engine = example_engine();
        let three = engine.combination_probability(&Combo::new(["A", "B", "C"]));
        let five = engine.combination_probability(&Combo::new(["A", "B", "C", "F", "F"]));
        assert_relative_eq!(three, five, epsilon = 1e-15);
    }

    #[test]
    fn test_theoretical_rtp_worked_example() {
        let engine = example_engine();
        // (0.3³·5 + 0.25³·7) · 100
        assert_relative_eq!(engine.theoretical_rtp(), 24.4375, epsilon = 1e-9);
        assert_relative_eq!(engine.house_edge(), 75.5625, epsilon = 1e-9);
    }

    #[test]
    fn test_adjust_to_current_rtp_is_identity() {
        let engine = example_engine();
        let current = engine.theoretical_rtp();
        let adjusted = engine.adjust_rtp_to_target(current);
        assert_eq!(&adjusted, engine.paytable());
    }

    #[test]
    fn test_adjust_scales_every_payout_uniformly() {
        let engine = example_engine();
        let current = engine.theoretical_rtp();
        let target = 95.0;
        let adjusted = engine.adjust_rtp_to_target(target);

        let factor = target / current;
        for (combo, payout) in engine.paytable().iter() {
            let expected = (payout * factor * 100.0).round() / 100.0;
            assert_relative_eq!(adjusted.get(combo).unwrap(), expected, epsilon = 1e-9);
        }
        // 5 · 95 / 24.4375 = 19.4373…, rounded to 2 decimals
        assert_relative_eq!(
            adjusted.get(&Combo::triple("A")).unwrap(),
            19.44,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_variance_classification_boundaries() {
        assert_eq!(VarianceLevel::classify(9.99), VarianceLevel::Low);
        assert_eq!(VarianceLevel::classify(10.0), VarianceLevel::Medium);
        assert_eq!(VarianceLevel::classify(29.99), VarianceLevel::Medium);
        assert_eq!(VarianceLevel::classify(30.0), VarianceLevel::High);
    }

    #[test]
    fn test_variance_expected_value_matches_base_win() {
        let engine = example_engine();
        let analysis = engine.analyze_variance();
        assert_relative_eq!(
            analysis.expected_value,
            engine.average_base_win(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            analysis.standard_deviation,
            analysis.variance.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_multiplier_and_bonus_terms_are_additive() {
        let mut symbols = SymbolSet::from_entries([
            ("A", SymbolDef::regular(30)),
            ("B", SymbolDef::regular(25)),
            ("C", SymbolDef::regular(20)),
            ("D", SymbolDef::regular(15)),
            ("E", SymbolDef::regular(7)),
            ("F", SymbolDef::regular(3)),
        ]);
        symbols.insert(
            "x2",
            SymbolDef::with_kind(10, SymbolKind::Multiplier { factor: 2 }),
        );
        symbols.insert("gift", SymbolDef::with_kind(10, SymbolKind::Bonus));

        let paytable = PayTable::from_entries([
            (Combo::triple("A"), 5.0),
            (Combo::triple("B"), 7.0),
        ]);
        let bonus = BonusSettings {
            bonus_spins: 3,
            bonus_multiplier: 1.5,
        };
        let engine = RtpEngine::new(symbols, paytable, bonus, RtpSettings::default());

        // Recompute the additive model by hand: total weight is 120.
        let total: f64 = 120.0;
        let base = (30.0 / total).powi(3) * 5.0 + (25.0 / total).powi(3) * 7.0;
        let p_mult = 10.0 / total;
        let mult_term = p_mult * (2.0 - 1.0) * base;
        let p_bonus = 10.0 / total;
        let trigger = 1.0 - (1.0 - p_bonus).powi(5);
        let bonus_term = trigger * 3.0 * 1.5 * base;

        assert_relative_eq!(
            engine.theoretical_rtp(),
            (base + mult_term + bonus_term) * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_empty_paytable_rtp_is_zero_and_adjust_is_noop() {
        let symbols = SymbolSet::from_entries([("A", SymbolDef::regular(1))]);
        let engine = RtpEngine::new(
            symbols,
            PayTable::new(),
            BonusSettings::default(),
            RtpSettings::default(),
        );
        assert_eq!(engine.theoretical_rtp(), 0.0);
        assert!(engine.adjust_rtp_to_target(95.0).is_empty());
    }
}
