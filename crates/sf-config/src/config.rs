//! Immutable game configuration snapshot

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use sf_math::{BonusSettings, Combo, PayTable, RtpEngine, RtpSettings, SymbolKind, SymbolSet};

use crate::error::ConfigError;
use crate::loader::{RawConfig, RawMultiplier, RawPayEntry, RawSpecials, RawSymbols};

/// Accepted target-RTP band, percent
pub const RTP_MIN: f64 = 70.0;
pub const RTP_MAX: f64 = 99.0;

/// Table-level game settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Balance granted to a fresh profile or guest session
    pub starting_balance: f64,
    /// Pool value after a jackpot is paid out
    pub jackpot_reset: f64,
    /// Pool seed on first launch
    pub initial_jackpot_pool: f64,
    /// Fraction of every bet fed into the pool
    pub jackpot_contribution_rate: f64,
    pub max_bet: f64,
    pub min_bet: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            starting_balance: 1000.0,
            jackpot_reset: 500.0,
            initial_jackpot_pool: 500.0,
            jackpot_contribution_rate: 0.1,
            max_bet: 500.0,
            min_bet: 1.0,
        }
    }
}

/// Named difficulty override set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPreset {
    #[serde(default)]
    pub target_rtp: Option<f64>,
    #[serde(default)]
    pub house_edge: Option<f64>,
    #[serde(default)]
    pub starting_balance: Option<f64>,
}

/// Validated, immutable configuration snapshot
///
/// Constructed from a [`RawConfig`] wire value; every accessor hands out
/// data that already passed validation. "Reload" means building a new one.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub settings: GameSettings,
    pub symbols: SymbolSet,
    pub paytable: PayTable,
    pub rtp: RtpSettings,
    pub bonus: BonusSettings,
    pub presets: BTreeMap<String, DifficultyPreset>,
}

impl GameConfig {
    /// Validate a wire config and freeze it into a snapshot
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let settings = raw
            .game_settings
            .ok_or(ConfigError::MissingSection("game_settings"))?;
        let raw_symbols = raw.symbols.ok_or(ConfigError::MissingSection("symbols"))?;
        let raw_paytable = raw.paytable.ok_or(ConfigError::MissingSection("paytable"))?;
        let rtp = raw
            .rtp_settings
            .ok_or(ConfigError::MissingSection("rtp_settings"))?;
        let bonus = raw.bonus_settings.unwrap_or_default();

        let symbols = build_symbol_set(raw_symbols)?;
        let paytable = build_paytable(raw_paytable);

        let config = Self {
            settings,
            symbols,
            paytable,
            rtp,
            bonus,
            presets: raw.difficulty_presets,
        };
        config.validate()?;
        Ok(config)
    }

    /// Re-check every invariant on the snapshot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() || self.symbols.total_weight() == 0 {
            return Err(ConfigError::DegenerateWeights);
        }

        if self.rtp.target_rtp < RTP_MIN || self.rtp.target_rtp > RTP_MAX {
            return Err(ConfigError::OutOfRange {
                field: "rtp_settings.target_rtp",
                value: self.rtp.target_rtp,
                min: RTP_MIN,
                max: RTP_MAX,
            });
        }

        // Declared edge should complement the target; tolerate drift with a
        // warning as the original did.
        if (self.rtp.target_rtp + self.rtp.house_edge - 100.0).abs() > 0.1 {
            log::warn!(
                "target RTP ({}%) + house edge ({}%) != 100%",
                self.rtp.target_rtp,
                self.rtp.house_edge
            );
        }

        for (combo, payout) in self.paytable.iter() {
            if payout < 0.0 {
                return Err(ConfigError::NegativePayout {
                    combo: combo.to_string(),
                    value: payout,
                });
            }
            for symbol in combo.symbols() {
                if !self.symbols.contains(symbol) {
                    return Err(ConfigError::UnknownSymbol {
                        context: "paytable",
                        symbol: symbol.clone(),
                    });
                }
            }
        }

        if self.settings.min_bet <= 0.0 || self.settings.min_bet > self.settings.max_bet {
            return Err(ConfigError::OutOfRange {
                field: "game_settings.min_bet",
                value: self.settings.min_bet,
                min: f64::MIN_POSITIVE,
                max: self.settings.max_bet,
            });
        }
        if !(0.0..=1.0).contains(&self.settings.jackpot_contribution_rate) {
            return Err(ConfigError::OutOfRange {
                field: "game_settings.jackpot_contribution_rate",
                value: self.settings.jackpot_contribution_rate,
                min: 0.0,
                max: 1.0,
            });
        }

        Ok(())
    }

    /// Snapshot with a named difficulty preset applied
    ///
    /// Returns a fresh validated configuration; `self` is untouched.
    pub fn apply_preset(&self, name: &str) -> Result<GameConfig, ConfigError> {
        let Some(preset) = self.presets.get(name) else {
            return Err(ConfigError::UnknownPreset {
                name: name.to_string(),
                available: self
                    .presets
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        };

        let mut next = self.clone();
        if let Some(target_rtp) = preset.target_rtp {
            next.rtp.target_rtp = target_rtp;
        }
        if let Some(house_edge) = preset.house_edge {
            next.rtp.house_edge = house_edge;
        }
        if let Some(balance) = preset.starting_balance {
            next.settings.starting_balance = balance;
        }
        next.validate()?;
        log::info!("applied difficulty preset `{name}`");
        Ok(next)
    }

    /// Snapshot with a replacement paytable (e.g. after RTP retargeting)
    pub fn with_paytable(&self, paytable: PayTable) -> Result<GameConfig, ConfigError> {
        let mut next = self.clone();
        next.paytable = paytable;
        next.validate()?;
        Ok(next)
    }

    /// RTP engine over this snapshot
    pub fn rtp_engine(&self) -> RtpEngine {
        RtpEngine::new(
            self.symbols.clone(),
            self.paytable.clone(),
            self.bonus,
            self.rtp,
        )
    }

    /// Lower the snapshot back to the wire representation
    pub fn to_raw(&self) -> RawConfig {
        let mut weights = BTreeMap::new();
        let mut specials = RawSpecials::default();
        for (name, def) in self.symbols.iter() {
            weights.insert(name.to_string(), def.weight);
            match def.kind {
                SymbolKind::Regular => {}
                SymbolKind::Wild => specials.wild = Some(name.to_string()),
                SymbolKind::Bonus => specials.bonus = Some(name.to_string()),
                SymbolKind::Jackpot => specials.jackpot = Some(name.to_string()),
                SymbolKind::Multiplier { factor } => specials.multipliers.push(RawMultiplier {
                    symbol: name.to_string(),
                    factor,
                }),
            }
        }

        RawConfig {
            game_settings: Some(self.settings),
            symbols: Some(RawSymbols {
                weights,
                special_symbols: Some(specials),
            }),
            paytable: Some(
                self.paytable
                    .iter()
                    .map(|(combo, pays)| RawPayEntry {
                        combo: combo.symbols().to_vec(),
                        pays,
                    })
                    .collect(),
            ),
            rtp_settings: Some(self.rtp),
            bonus_settings: Some(self.bonus),
            difficulty_presets: self.presets.clone(),
        }
    }

    /// Formatted configuration overview, including the theoretical RTP
    pub fn summary(&self) -> String {
        let engine = self.rtp_engine();
        let total_weight = self.symbols.total_weight() as f64;

        let mut out = String::new();
        let _ = writeln!(out, "SPINFORGE CONFIGURATION");
        let _ = writeln!(out, "=======================");
        let _ = writeln!(out, "Starting balance:  {:.2}", self.settings.starting_balance);
        let _ = writeln!(out, "Target RTP:        {:.2}%", self.rtp.target_rtp);
        let _ = writeln!(out, "House edge:        {:.2}%", self.rtp.house_edge);
        let _ = writeln!(out, "Theoretical RTP:   {:.2}%", engine.theoretical_rtp());
        let _ = writeln!(
            out,
            "Jackpot pool:      {:.2} (reset {:.2}, {:.0}% of each bet)",
            self.settings.initial_jackpot_pool,
            self.settings.jackpot_reset,
            self.settings.jackpot_contribution_rate * 100.0
        );
        let _ = writeln!(
            out,
            "Bonus round:       {} spins x{:.1}",
            self.bonus.bonus_spins, self.bonus.bonus_multiplier
        );
        let _ = writeln!(
            out,
            "Bets:              {:.2}..{:.2}",
            self.settings.min_bet, self.settings.max_bet
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Symbol weights:");
        for (name, def) in self.symbols.iter() {
            let _ = writeln!(
                out,
                "  {name:<10} {:>4}  ({:.1}%)",
                def.weight,
                def.weight as f64 / total_weight * 100.0
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Paytable:");
        for (combo, pays) in self.paytable.iter() {
            let _ = writeln!(out, "  {combo}: {pays:.2}x");
        }
        if !self.presets.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Difficulty presets: {}",
                self.presets.keys().cloned().collect::<Vec<_>>().join(", ")
            );
        }
        out
    }
}

fn build_symbol_set(raw: RawSymbols) -> Result<SymbolSet, ConfigError> {
    use sf_math::SymbolDef;

    let specials = raw.special_symbols.unwrap_or_default();

    let mut roles: Vec<(String, SymbolKind)> = Vec::new();
    if let Some(bonus) = specials.bonus.clone() {
        roles.push((bonus, SymbolKind::Bonus));
    }
    if let Some(wild) = specials.wild.clone() {
        roles.push((wild, SymbolKind::Wild));
    }
    if let Some(jackpot) = specials.jackpot.clone() {
        roles.push((jackpot, SymbolKind::Jackpot));
    }
    for mult in &specials.multipliers {
        roles.push((
            mult.symbol.clone(),
            SymbolKind::Multiplier {
                factor: mult.factor,
            },
        ));
    }

    let mut kinds: BTreeMap<String, SymbolKind> = BTreeMap::new();
    for (symbol, kind) in roles {
        if !raw.weights.contains_key(&symbol) {
            return Err(ConfigError::UnknownSymbol {
                context: "special_symbols",
                symbol,
            });
        }
        if kinds.insert(symbol.clone(), kind).is_some() {
            return Err(ConfigError::DuplicateRole { symbol });
        }
    }

    let mut set = SymbolSet::new();
    for (name, weight) in &raw.weights {
        let kind = kinds.get(name).copied().unwrap_or(SymbolKind::Regular);
        set.insert(name.clone(), SymbolDef::with_kind(*weight, kind));
    }
    Ok(set)
}

fn build_paytable(raw: Vec<RawPayEntry>) -> PayTable {
    PayTable::from_entries(
        raw.into_iter()
            .map(|entry| (Combo::new(entry.combo), entry.pays)),
    )
}
