//! Crash round state machine and auto-cashout resolution

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Crash game settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrashConfig {
    /// Lower bound of the sampled crash point
    pub min_crash: f64,
    /// Upper bound of the sampled crash point
    pub max_crash: f64,
    /// Multiplier growth per tick
    pub tick_increment: f64,
    /// Balance granted to a fresh session
    pub starting_balance: f64,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            min_crash: 1.5,
            max_crash: 10.0,
            tick_increment: 0.01,
            starting_balance: 1000.0,
        }
    }
}

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoundState {
    /// Bet placed, flight not started
    Armed,
    /// Multiplier climbing
    Flying,
    /// Cashed out at the recorded multiplier
    CashedOut { at: f64 },
    /// Multiplier reached the crash point; the bet is lost
    Crashed,
}

/// One crash round
///
/// The crash point stays hidden from the caller until the round ends.
#[derive(Debug, Clone)]
pub struct CrashRound {
    crash_point: f64,
    tick_increment: f64,
    multiplier: f64,
    bet: f64,
    /// Auto-cashout multiplier, if the player set one
    target: Option<f64>,
    state: RoundState,
}

/// Outcome of a resolved round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrashOutcome {
    pub crash_point: f64,
    /// Multiplier the win was locked at, if any
    pub cashed_out_at: Option<f64>,
    /// Amount returned to the player (0 on a crash)
    pub payout: f64,
    /// Payout minus the bet
    pub net: f64,
}

impl CrashRound {
    /// Arm a round: sample a crash point and stake `bet`
    pub fn new(rng: &mut impl Rng, config: &CrashConfig, bet: f64) -> Result<Self, CrashError> {
        if bet <= 0.0 {
            return Err(CrashError::InvalidBet(bet));
        }
        let crash_point = rng.random_range(config.min_crash..config.max_crash);
        Ok(Self::with_crash_point(config, bet, crash_point))
    }

    /// Arm a round with a fixed crash point (replay and tests)
    pub fn with_crash_point(config: &CrashConfig, bet: f64, crash_point: f64) -> Self {
        Self {
            crash_point,
            tick_increment: config.tick_increment,
            multiplier: 1.0,
            bet,
            target: None,
            state: RoundState::Armed,
        }
    }

    /// Set an auto-cashout target (must exceed 1.0)
    pub fn set_target(&mut self, target: f64) -> Result<(), CrashError> {
        if target <= 1.0 {
            return Err(CrashError::InvalidTarget(target));
        }
        self.target = Some(target);
        Ok(())
    }

    /// Begin the flight
    pub fn start(&mut self) {
        if self.state == RoundState::Armed {
            self.state = RoundState::Flying;
        }
    }

    /// Current multiplier
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Current state
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Staked bet
    pub fn bet(&self) -> f64 {
        self.bet
    }

    /// Advance the multiplier by one tick
    ///
    /// Auto-cashout fires when the target is reached before the crash
    /// point; otherwise reaching the crash point ends the round lost.
    pub fn tick(&mut self) -> RoundState {
        if self.state != RoundState::Flying {
            return self.state;
        }

        self.multiplier += self.tick_increment;

        if let Some(target) = self.target {
            if self.multiplier >= target && target <= self.crash_point {
                self.state = RoundState::CashedOut { at: target };
                return self.state;
            }
        }
        if self.multiplier >= self.crash_point {
            self.state = RoundState::Crashed;
            log::debug!("round crashed at {:.2}x", self.crash_point);
        }
        self.state
    }

    /// Cash out manually at the current multiplier
    pub fn cash_out(&mut self) -> RoundState {
        if self.state == RoundState::Flying {
            self.state = RoundState::CashedOut {
                at: self.multiplier,
            };
        }
        self.state
    }

    /// Outcome for a finished round; `None` while still in flight
    pub fn outcome(&self) -> Option<CrashOutcome> {
        match self.state {
            RoundState::CashedOut { at } => Some(CrashOutcome {
                crash_point: self.crash_point,
                cashed_out_at: Some(at),
                payout: self.bet * at,
                net: self.bet * at - self.bet,
            }),
            RoundState::Crashed => Some(CrashOutcome {
                crash_point: self.crash_point,
                cashed_out_at: None,
                payout: 0.0,
                net: -self.bet,
            }),
            RoundState::Armed | RoundState::Flying => None,
        }
    }
}

/// Resolve a full round with an auto-cashout target
///
/// The win pays at the *target* multiplier even when the crash point is
/// higher; a target above the crash point loses the bet.
pub fn resolve(
    rng: &mut impl Rng,
    config: &CrashConfig,
    bet: f64,
    target: f64,
) -> Result<CrashOutcome, CrashError> {
    let mut round = CrashRound::new(rng, config, bet)?;
    round.set_target(target)?;
    round.start();
    while round.tick() == RoundState::Flying {}
    match round.outcome() {
        Some(outcome) => Ok(outcome),
        // The flight loop only exits in a terminal state.
        None => Err(CrashError::InvalidTarget(target)),
    }
}

/// Crash round failures
#[derive(Debug, thiserror::Error)]
pub enum CrashError {
    #[error("bet must be positive, got {0}")]
    InvalidBet(f64),

    #[error("target multiplier must exceed 1.0, got {0}")]
    InvalidTarget(f64),
}
