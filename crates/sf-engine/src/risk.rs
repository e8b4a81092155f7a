//! Dice-risk side game
//!
//! A winning spin can be staked on a two-die roll: a high total doubles
//! the win, anything else forfeits it. Repeatable up to a configured
//! number of attempts while the stake survives.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum dice total that doubles the stake (P = 15/36)
pub const DICE_WIN_THRESHOLD: u8 = 8;

/// Dice-risk settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRiskConfig {
    /// Maximum rolls per staked win
    pub max_attempts: u8,
}

impl Default for DiceRiskConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

/// Result of one dice roll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub dice: (u8, u8),
    pub total: u8,
    /// Did the roll double the stake?
    pub doubled: bool,
    /// Stake after the roll (0 on forfeit)
    pub stake_after: f64,
}

/// Double-or-nothing state for one staked win
#[derive(Debug, Clone)]
pub struct DiceRisk {
    config: DiceRiskConfig,
    stake: f64,
    attempts_used: u8,
    forfeited: bool,
}

impl DiceRisk {
    /// Stake a win with default settings
    pub fn new(stake: f64) -> Self {
        Self::with_config(stake, DiceRiskConfig::default())
    }

    /// Stake a win with explicit settings
    pub fn with_config(stake: f64, config: DiceRiskConfig) -> Self {
        Self {
            config,
            stake,
            attempts_used: 0,
            forfeited: false,
        }
    }

    /// Current stake (0 after a forfeit)
    pub fn stake(&self) -> f64 {
        self.stake
    }

    /// Rolls taken so far
    pub fn attempts_used(&self) -> u8 {
        self.attempts_used
    }

    /// Can the player roll again?
    pub fn can_roll(&self) -> bool {
        !self.forfeited && self.stake > 0.0 && self.attempts_used < self.config.max_attempts
    }

    /// Roll the dice, doubling or forfeiting the stake
    ///
    /// Returns `None` once no further roll is available.
    pub fn roll(&mut self, rng: &mut impl Rng) -> Option<DiceRoll> {
        if !self.can_roll() {
            return None;
        }
        self.attempts_used += 1;

        let dice = (rng.random_range(1..=6), rng.random_range(1..=6));
        let total = dice.0 + dice.1;
        let doubled = total >= DICE_WIN_THRESHOLD;

        if doubled {
            self.stake *= 2.0;
        } else {
            self.stake = 0.0;
            self.forfeited = true;
        }

        Some(DiceRoll {
            dice,
            total,
            doubled,
            stake_after: self.stake,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_roll_doubles_or_forfeits() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut risk = DiceRisk::new(40.0);
        let mut before = risk.stake();

        while let Some(roll) = risk.roll(&mut rng) {
            assert_eq!(roll.total, roll.dice.0 + roll.dice.1);
            assert!((1..=6).contains(&roll.dice.0));
            assert!((1..=6).contains(&roll.dice.1));
            assert_eq!(roll.doubled, roll.total >= DICE_WIN_THRESHOLD);
            if roll.doubled {
                assert_eq!(roll.stake_after, before * 2.0);
            } else {
                assert_eq!(roll.stake_after, 0.0);
            }
            before = roll.stake_after;
        }

        // Either forfeited or out of attempts.
        assert!(!risk.can_roll());
        assert!(risk.attempts_used() <= 5);
    }

    #[test]
    fn test_forfeit_ends_the_feature() {
        let mut risk = DiceRisk::new(10.0);
        risk.stake = 0.0;
        risk.forfeited = true;
        let mut rng = StdRng::seed_from_u64(1);
        assert!(risk.roll(&mut rng).is_none());
    }

    #[test]
    fn test_attempt_cap_is_respected() {
        let config = DiceRiskConfig { max_attempts: 2 };
        let mut risk = DiceRisk::with_config(10.0, config);
        let mut rng = StdRng::seed_from_u64(3);

        let mut rolls = 0;
        while risk.roll(&mut rng).is_some() {
            rolls += 1;
        }
        assert!(rolls <= 2);
    }

    #[test]
    fn test_zero_stake_cannot_roll() {
        let risk = DiceRisk::new(0.0);
        assert!(!risk.can_roll());
    }
}
