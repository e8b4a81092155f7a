//! JSON wire format and file loading

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sf_math::{BonusSettings, RtpSettings};

use crate::config::{DifficultyPreset, GameConfig, GameSettings};
use crate::defaults::default_config;
use crate::error::ConfigError;

/// Top-level wire config
///
/// Sections are optional here so that [`GameConfig::from_raw`] can report
/// exactly which required section is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub game_settings: Option<GameSettings>,
    #[serde(default)]
    pub symbols: Option<RawSymbols>,
    #[serde(default)]
    pub paytable: Option<Vec<RawPayEntry>>,
    #[serde(default)]
    pub rtp_settings: Option<RtpSettings>,
    #[serde(default)]
    pub bonus_settings: Option<BonusSettings>,
    #[serde(default)]
    pub difficulty_presets: BTreeMap<String, DifficultyPreset>,
}

/// `symbols` section: weights plus special-role designations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSymbols {
    pub weights: BTreeMap<String, u32>,
    #[serde(default)]
    pub special_symbols: Option<RawSpecials>,
}

/// Special-role designations inside the `symbols` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSpecials {
    #[serde(default)]
    pub bonus: Option<String>,
    #[serde(default)]
    pub wild: Option<String>,
    #[serde(default)]
    pub jackpot: Option<String>,
    #[serde(default)]
    pub multipliers: Vec<RawMultiplier>,
}

/// A multiplier symbol with its explicit factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMultiplier {
    pub symbol: String,
    pub factor: u32,
}

/// One paytable row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPayEntry {
    pub combo: Vec<String>,
    pub pays: f64,
}

/// Parse and validate a configuration from a JSON string
pub fn from_json_str(json: &str) -> Result<GameConfig, ConfigError> {
    let raw: RawConfig = serde_json::from_str(json)?;
    GameConfig::from_raw(raw)
}

/// Load and validate a configuration file
pub fn load(path: impl AsRef<Path>) -> Result<GameConfig, ConfigError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let config = from_json_str(&json)?;
    log::info!("configuration loaded from {}", path.display());
    Ok(config)
}

/// Load a configuration file, materialising the defaults first if absent
pub fn load_or_init(path: impl AsRef<Path>) -> Result<GameConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        write_default(path)?;
    }
    load(path)
}

/// Write the built-in default configuration to `path`
pub fn write_default(path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    write(path, &default_config())?;
    log::info!("created default config file at {}", path.display());
    Ok(())
}

/// Serialise a snapshot back to pretty JSON at `path`
pub fn write(path: impl AsRef<Path>, config: &GameConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(&config.to_raw())?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sf_math::{Combo, SymbolKind};

    const MINIMAL: &str = r#"{
        "game_settings": {
            "starting_balance": 1000.0,
            "jackpot_reset": 500.0,
            "initial_jackpot_pool": 500.0,
            "jackpot_contribution_rate": 0.1,
            "max_bet": 500.0,
            "min_bet": 1.0
        },
        "symbols": {
            "weights": { "cherry": 30, "lemon": 25, "gift": 5, "x2": 5 },
            "special_symbols": {
                "bonus": "gift",
                "multipliers": [ { "symbol": "x2", "factor": 2 } ]
            }
        },
        "paytable": [
            { "combo": ["cherry", "cherry", "cherry"], "pays": 5.0 },
            { "combo": ["lemon", "lemon", "lemon"], "pays": 7.0 }
        ],
        "rtp_settings": { "target_rtp": 94.5, "house_edge": 5.5 },
        "bonus_settings": { "bonus_spins": 3, "bonus_multiplier": 1.0 }
    }"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = from_json_str(MINIMAL).unwrap();
        assert_eq!(config.symbols.len(), 4);
        assert_eq!(config.symbols.bonus(), Some("gift"));
        assert_eq!(config.symbols.multipliers(), vec![("x2", 2)]);
        assert_eq!(config.paytable.len(), 2);
        assert_relative_eq!(config.rtp.target_rtp, 94.5);
    }

    #[test]
    fn test_missing_section_is_named() {
        let json = r#"{ "symbols": { "weights": { "a": 1 } } }"#;
        let err = from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("game_settings")));
    }

    #[test]
    fn test_rtp_out_of_band_rejected() {
        let json = MINIMAL.replace("94.5", "65.0");
        let err = from_json_str(&json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "rtp_settings.target_rtp",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_weights_rejected() {
        let json = MINIMAL
            .replace("\"cherry\": 30", "\"cherry\": 0")
            .replace("\"lemon\": 25", "\"lemon\": 0")
            .replace("\"gift\": 5", "\"gift\": 0")
            .replace("\"x2\": 5", "\"x2\": 0");
        let err = from_json_str(&json).unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateWeights));
    }

    #[test]
    fn test_paytable_unknown_symbol_rejected() {
        let json = MINIMAL.replace("\"lemon\", \"lemon\", \"lemon\"", "\"plum\", \"plum\", \"plum\"");
        let err = from_json_str(&json).unwrap_err();
        match err {
            ConfigError::UnknownSymbol { context, symbol } => {
                assert_eq!(context, "paytable");
                assert_eq!(symbol, "plum");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_special_unknown_symbol_rejected() {
        let json = MINIMAL.replace("\"bonus\": \"gift\"", "\"bonus\": \"ghost\"");
        let err = from_json_str(&json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownSymbol {
                context: "special_symbols",
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let json = MINIMAL.replace(
            "\"bonus\": \"gift\"",
            "\"bonus\": \"gift\", \"wild\": \"gift\"",
        );
        let err = from_json_str(&json).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRole { .. }));
    }

    #[test]
    fn test_default_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let loaded = load_or_init(&path).unwrap();
        let defaults = default_config();
        assert_eq!(loaded.symbols, defaults.symbols);
        assert_eq!(loaded.paytable, defaults.paytable);
        assert_relative_eq!(loaded.rtp.target_rtp, defaults.rtp.target_rtp);

        // Second load reads the existing file rather than re-creating it.
        let again = load_or_init(&path).unwrap();
        assert_eq!(again.paytable, defaults.paytable);
    }

    #[test]
    fn test_preset_application_returns_new_snapshot() {
        let config = default_config();
        let easy = config.apply_preset("easy").unwrap();
        assert_relative_eq!(easy.rtp.target_rtp, 97.0);
        // Original snapshot is untouched.
        assert_relative_eq!(config.rtp.target_rtp, 94.5);

        let err = config.apply_preset("nightmare").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset { .. }));
    }

    #[test]
    fn test_wild_role_survives_round_trip() {
        let config = default_config();
        let raw = config.to_raw();
        let back = GameConfig::from_raw(raw).unwrap();
        assert_eq!(back.symbols.wild(), config.symbols.wild());
        assert_eq!(
            back.symbols.get("x5").map(|d| d.kind),
            Some(SymbolKind::Multiplier { factor: 5 })
        );
        assert_eq!(
            back.paytable.get(&Combo::triple("joker")),
            config.paytable.get(&Combo::triple("joker"))
        );
    }

    #[test]
    fn test_summary_mentions_theoretical_rtp() {
        let config = from_json_str(MINIMAL).unwrap();
        let summary = config.summary();
        assert!(summary.contains("Theoretical RTP"));
        assert!(summary.contains("cherry"));
    }
}
