//! Slot engine — reel draws and win evaluation

use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use sf_config::GameConfig;
use sf_math::{Combo, COMBO_LEN, REEL_COUNT};

use crate::session::SessionStats;

/// Slot machine engine
///
/// Holds a configuration snapshot, the weighted reel distribution derived
/// from it, the progressive jackpot pool, and running session statistics.
pub struct SlotEngine {
    config: GameConfig,
    /// Symbol names, index-aligned with the weight distribution
    names: Vec<String>,
    dist: WeightedIndex<u32>,
    rng: StdRng,
    jackpot_pool: f64,
    stats: SessionStats,
}

/// Outcome of a single spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpinOutcome {
    /// No winning combination
    Loss,
    /// Paytable win, multiplier already applied
    Win { amount: f64, multiplier: u32 },
    /// All five reels showed the jackpot symbol; the pool paid out
    Jackpot { amount: f64 },
    /// A bonus symbol landed and the free-spin round ran
    Bonus(BonusRound),
}

impl SpinOutcome {
    /// Amount credited to the player for this outcome
    pub fn total_win(&self) -> f64 {
        match self {
            SpinOutcome::Loss => 0.0,
            SpinOutcome::Win { amount, .. } => *amount,
            SpinOutcome::Jackpot { amount } => *amount,
            SpinOutcome::Bonus(round) => round.total_win,
        }
    }
}

/// One free spin inside the bonus round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSpin {
    pub reels: Vec<String>,
    /// Base win for this spin, before the bonus multiplier
    pub win: f64,
}

/// Resolved free-spin round
///
/// Nested bonus triggers and jackpot lines do not pay inside the round;
/// only paytable wins (with multiplier symbols) accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusRound {
    pub spins: Vec<BonusSpin>,
    /// Sum of base wins scaled by the configured bonus multiplier
    pub total_win: f64,
}

/// Full result of one paid spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub reels: Vec<String>,
    pub bet: f64,
    pub outcome: SpinOutcome,
    /// Pool value after contribution and any jackpot payout
    pub jackpot_pool: f64,
}

impl SlotEngine {
    /// Engine with OS-seeded randomness
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Engine with deterministic randomness, for replay and tests
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, EngineError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, EngineError> {
        let names: Vec<String> = config
            .symbols
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        let weights: Vec<u32> = config
            .symbols
            .iter()
            .map(|(_, def)| def.weight)
            .collect();
        let dist = WeightedIndex::new(&weights)
            .map_err(|err| EngineError::DegenerateWeights(err.to_string()))?;

        let jackpot_pool = config.settings.initial_jackpot_pool;
        Ok(Self {
            config,
            names,
            dist,
            rng,
            jackpot_pool,
            stats: SessionStats::default(),
        })
    }

    /// The configuration snapshot this engine runs on
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current progressive pool
    pub fn jackpot_pool(&self) -> f64 {
        self.jackpot_pool
    }

    /// Restore a persisted pool value (e.g. from the store at startup)
    pub fn set_jackpot_pool(&mut self, pool: f64) {
        self.jackpot_pool = pool;
    }

    /// Session statistics so far
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Run one paid spin
    ///
    /// Validates the bet against the configured band, feeds the jackpot
    /// pool, draws the reels, and resolves the outcome. Balance checks are
    /// the caller's concern.
    pub fn spin(&mut self, bet: f64) -> Result<SpinResult, EngineError> {
        let min = self.config.settings.min_bet;
        let max = self.config.settings.max_bet;
        if bet < min || bet > max {
            return Err(EngineError::InvalidBet { bet, min, max });
        }

        self.jackpot_pool += bet * self.config.settings.jackpot_contribution_rate;

        let reels = self.draw_reels();
        let outcome = self.evaluate_reels(&reels, bet);

        if let SpinOutcome::Jackpot { amount } = outcome {
            log::info!("jackpot hit: {amount:.2} paid, pool reset");
        }

        self.stats.record(bet, &outcome);
        Ok(SpinResult {
            reels,
            bet,
            outcome,
            jackpot_pool: self.jackpot_pool,
        })
    }

    fn draw_reels(&mut self) -> Vec<String> {
        (0..REEL_COUNT)
            .map(|_| self.names[self.dist.sample(&mut self.rng)].clone())
            .collect()
    }

    /// Resolve a set of drawn reels against the configuration
    ///
    /// Precedence mirrors the paytable-first rule: a listed combination
    /// pays (scaled by the last multiplier symbol on the reels), then a
    /// full jackpot line, then the bonus trigger, else a loss.
    fn evaluate_reels(&mut self, reels: &[String], bet: f64) -> SpinOutcome {
        let combo = Combo::new(reels.iter().take(COMBO_LEN).cloned());
        let multiplier = self.reel_multiplier(reels);

        if let Some(pays) = self.config.paytable.get(&combo) {
            return SpinOutcome::Win {
                amount: pays * bet * multiplier as f64,
                multiplier,
            };
        }

        if let Some(jackpot_symbol) = self.config.symbols.jackpot() {
            if reels.iter().all(|reel| reel == jackpot_symbol) {
                let amount = self.jackpot_pool;
                self.jackpot_pool = self.config.settings.jackpot_reset;
                return SpinOutcome::Jackpot { amount };
            }
        }

        if let Some(bonus_symbol) = self.config.symbols.bonus() {
            if reels.iter().any(|reel| reel == bonus_symbol) {
                let round = self.run_bonus_round(bet);
                return SpinOutcome::Bonus(round);
            }
        }

        SpinOutcome::Loss
    }

    /// Free-spin round: base wins only, scaled by the bonus multiplier
    fn run_bonus_round(&mut self, bet: f64) -> BonusRound {
        let bonus = self.config.bonus;
        let mut spins = Vec::with_capacity(bonus.bonus_spins as usize);
        let mut base_total = 0.0;

        for _ in 0..bonus.bonus_spins {
            let reels = self.draw_reels();
            let win = self.base_win(&reels, bet);
            base_total += win;
            spins.push(BonusSpin { reels, win });
        }

        BonusRound {
            spins,
            total_win: base_total * bonus.bonus_multiplier,
        }
    }

    /// Paytable win (with multipliers) for a draw, ignoring jackpot/bonus
    fn base_win(&self, reels: &[String], bet: f64) -> f64 {
        let combo = Combo::new(reels.iter().take(COMBO_LEN).cloned());
        match self.config.paytable.get(&combo) {
            Some(pays) => pays * bet * self.reel_multiplier(reels) as f64,
            None => 0.0,
        }
    }

    /// The multiplier factor in effect: the last multiplier symbol drawn
    fn reel_multiplier(&self, reels: &[String]) -> u32 {
        let mut multiplier = 1;
        for reel in reels {
            if let Some(def) = self.config.symbols.get(reel) {
                if let Some(factor) = def.kind.multiplier_factor() {
                    multiplier = factor;
                }
            }
        }
        multiplier
    }
}

/// Engine failures
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("bet {bet} outside allowed range {min}..={max}")]
    InvalidBet { bet: f64, min: f64, max: f64 },

    #[error("degenerate symbol weights: {0}")]
    DegenerateWeights(String),
}
