//! Built-in default configuration
//!
//! Mirrors the classic fruit-machine table: twelve symbols, three
//! multipliers, a bonus and a wild, 94.5% target RTP.

use std::collections::BTreeMap;

use sf_math::{BonusSettings, Combo, PayTable, RtpSettings, SymbolDef, SymbolKind, SymbolSet};

use crate::config::{DifficultyPreset, GameConfig, GameSettings};

/// The default snapshot used when no config file exists yet
pub fn default_config() -> GameConfig {
    let symbols = SymbolSet::from_entries([
        ("cherry", SymbolDef::regular(30)),
        ("lemon", SymbolDef::regular(25)),
        ("bell", SymbolDef::regular(20)),
        ("star", SymbolDef::regular(15)),
        ("seven", SymbolDef::regular(7)),
        ("melon", SymbolDef::regular(3)),
        ("coin", SymbolDef::with_kind(1, SymbolKind::Jackpot)),
        ("gift", SymbolDef::with_kind(5, SymbolKind::Bonus)),
        ("joker", SymbolDef::with_kind(8, SymbolKind::Wild)),
        ("x2", SymbolDef::with_kind(5, SymbolKind::Multiplier { factor: 2 })),
        ("x3", SymbolDef::with_kind(3, SymbolKind::Multiplier { factor: 3 })),
        ("x5", SymbolDef::with_kind(2, SymbolKind::Multiplier { factor: 5 })),
    ]);

    let paytable = PayTable::from_entries([
        (Combo::triple("cherry"), 5.0),
        (Combo::triple("lemon"), 7.0),
        (Combo::triple("bell"), 10.0),
        (Combo::triple("star"), 20.0),
        (Combo::triple("seven"), 50.0),
        (Combo::triple("melon"), 100.0),
        (Combo::triple("joker"), 200.0),
    ]);

    let presets = BTreeMap::from([
        (
            "easy".to_string(),
            DifficultyPreset {
                target_rtp: Some(97.0),
                house_edge: Some(3.0),
                starting_balance: Some(2000.0),
            },
        ),
        (
            "normal".to_string(),
            DifficultyPreset {
                target_rtp: Some(94.5),
                house_edge: Some(5.5),
                starting_balance: Some(1000.0),
            },
        ),
        (
            "hard".to_string(),
            DifficultyPreset {
                target_rtp: Some(90.0),
                house_edge: Some(10.0),
                starting_balance: Some(500.0),
            },
        ),
    ]);

    GameConfig {
        settings: GameSettings::default(),
        symbols,
        paytable,
        rtp: RtpSettings {
            target_rtp: 94.5,
            house_edge: 5.5,
        },
        bonus: BonusSettings {
            bonus_spins: 3,
            bonus_multiplier: 1.0,
        },
        presets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = default_config();
        config.validate().unwrap();
        assert_eq!(config.symbols.bonus(), Some("gift"));
        assert_eq!(config.symbols.wild(), Some("joker"));
        assert_eq!(config.symbols.jackpot(), Some("coin"));
        assert_eq!(config.symbols.multipliers().len(), 3);
    }

    #[test]
    fn test_default_rtp_is_computable() {
        let engine = default_config().rtp_engine();
        let rtp = engine.theoretical_rtp();
        assert!(rtp > 0.0 && rtp < 100.0, "rtp = {rtp}");
    }
}
