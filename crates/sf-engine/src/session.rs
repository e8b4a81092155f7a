//! Session statistics

use serde::{Deserialize, Serialize};

use crate::engine::SpinOutcome;

/// Running statistics for a play session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    pub wins: u64,
    pub losses: u64,
    pub bonus_rounds: u64,
    pub jackpots: u64,
    pub biggest_win: f64,
}

impl SessionStats {
    /// Record one resolved spin
    pub fn record(&mut self, bet: f64, outcome: &SpinOutcome) {
        self.total_spins += 1;
        self.total_bet += bet;

        let win = outcome.total_win();
        self.total_win += win;
        if win > self.biggest_win {
            self.biggest_win = win;
        }

        match outcome {
            SpinOutcome::Loss => self.losses += 1,
            SpinOutcome::Win { .. } => self.wins += 1,
            SpinOutcome::Jackpot { .. } => {
                self.wins += 1;
                self.jackpots += 1;
            }
            SpinOutcome::Bonus(round) => {
                self.bonus_rounds += 1;
                if round.total_win > 0.0 {
                    self.wins += 1;
                } else {
                    self.losses += 1;
                }
            }
        }
    }

    /// Realised RTP so far, percent
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            self.total_win / self.total_bet * 100.0
        } else {
            0.0
        }
    }

    /// Fraction of spins that won anything, percent
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            self.wins as f64 / self.total_spins as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Net player result (wins minus bets)
    pub fn net(&self) -> f64 {
        self.total_win - self.total_bet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_record_win_and_loss() {
        let mut stats = SessionStats::default();
        stats.record(
            10.0,
            &SpinOutcome::Win {
                amount: 50.0,
                multiplier: 1,
            },
        );
        stats.record(10.0, &SpinOutcome::Loss);

        assert_eq!(stats.total_spins, 2);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_relative_eq!(stats.total_bet, 20.0);
        assert_relative_eq!(stats.total_win, 50.0);
        assert_relative_eq!(stats.biggest_win, 50.0);
        assert_relative_eq!(stats.rtp(), 250.0);
        assert_relative_eq!(stats.hit_rate(), 50.0);
        assert_relative_eq!(stats.net(), 30.0);
    }

    #[test]
    fn test_empty_session_rates_are_zero() {
        let stats = SessionStats::default();
        assert_eq!(stats.rtp(), 0.0);
        assert_eq!(stats.hit_rate(), 0.0);
    }
}
