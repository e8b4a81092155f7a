//! SpinForge CLI
//!
//! Usage:
//!   spinforge slots               - Play the slot machine
//!   spinforge crash               - Play the crash game
//!   spinforge analyze             - Print the RTP analysis report
//!   spinforge adjust --target 95  - Retarget the paytable
//!   spinforge validate            - Check a config file
//!   spinforge summary             - Print the configuration summary
//!   spinforge stats --user NAME   - Show a profile and recent sessions

mod crash;
mod slots;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;

use sf_config::GameConfig;

#[derive(Parser)]
#[command(name = "spinforge", about = "Casino mini-game lab with a tunable RTP core")]
struct Cli {
    /// Configuration file (created with defaults when absent)
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the slot machine
    Slots {
        /// Profile to play as (guest mode when omitted)
        #[arg(long)]
        user: Option<String>,
        /// Run this many spins without prompting
        #[arg(long)]
        auto: Option<u32>,
        /// Bet per spin (defaults to the configured minimum)
        #[arg(long)]
        bet: Option<f64>,
        /// Database file
        #[arg(long, default_value = "spinforge.db")]
        db: PathBuf,
        /// Apply a difficulty preset before playing
        #[arg(long)]
        preset: Option<String>,
    },
    /// Play the crash game
    Crash {
        /// Bet per round (prompted when omitted)
        #[arg(long)]
        bet: Option<f64>,
        /// Auto-cashout multiplier
        #[arg(long)]
        target: Option<f64>,
        /// Rounds to resolve non-interactively
        #[arg(long)]
        rounds: Option<u32>,
    },
    /// Print the RTP analysis report
    Analyze,
    /// Retarget the paytable to a desired RTP
    Adjust {
        /// Target RTP percentage
        #[arg(short, long)]
        target: f64,
        /// Write the adjusted paytable back to the config file
        #[arg(long)]
        write: bool,
    },
    /// Load and validate the config file
    Validate,
    /// Print the configuration summary
    Summary,
    /// Show a stored profile and its recent sessions
    Stats {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "spinforge.db")]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("starting spinforge");
    let cli = Cli::parse();

    match cli.command {
        Commands::Slots {
            user,
            auto,
            bet,
            db,
            preset,
        } => {
            let mut config = load_config(&cli.config)?;
            if let Some(name) = preset {
                config = config.apply_preset(&name)?;
            }
            slots::run(config, &db, user, auto, bet)
        }
        Commands::Crash { bet, target, rounds } => crash::run(bet, target, rounds),
        Commands::Analyze => {
            let config = load_config(&cli.config)?;
            println!("{}", config.rtp_engine().analysis_report());
            Ok(())
        }
        Commands::Adjust { target, write } => adjust(&cli.config, target, write),
        Commands::Validate => validate(&cli.config),
        Commands::Summary => {
            let config = load_config(&cli.config)?;
            println!("{}", config.summary());
            Ok(())
        }
        Commands::Stats { user, db } => stats(&db, &user),
    }
}

fn load_config(path: &Path) -> Result<GameConfig> {
    sf_config::load_or_init(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

fn adjust(path: &Path, target: f64, write: bool) -> Result<()> {
    if !(sf_config::RTP_MIN..=sf_config::RTP_MAX).contains(&target) {
        bail!(
            "target RTP {target}% outside accepted band {}..={}%",
            sf_config::RTP_MIN,
            sf_config::RTP_MAX
        );
    }

    let config = load_config(path)?;
    let engine = config.rtp_engine();
    let current = engine.theoretical_rtp();
    let adjusted = engine.adjust_rtp_to_target(target);

    println!("Current RTP: {current:.4}%  ->  target {target:.2}%");
    println!();
    println!("{:<40} {:>10} {:>10}", "combination", "old", "new");
    for (combo, old) in config.paytable.iter() {
        let new = adjusted.get(combo).unwrap_or(old);
        println!("{:<40} {:>9.2}x {:>9.2}x", combo.to_string(), old, new);
    }

    if write {
        let updated = config.with_paytable(adjusted)?;
        sf_config::write(path, &updated)?;
        println!();
        println!("{}", "Adjusted paytable written back to config".green());
    }
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let config = sf_config::load(path)
        .with_context(|| format!("configuration at {} is invalid", path.display()))?;
    let engine = config.rtp_engine();
    println!("{}", "Configuration OK".green());
    println!("Theoretical RTP: {:.2}%", engine.theoretical_rtp());
    println!("House edge:      {:.2}%", engine.house_edge());
    Ok(())
}

fn stats(db: &Path, user: &str) -> Result<()> {
    let store = sf_store::Store::open(db)?;
    let profile = store.require_user(user)?;

    println!("{}", format!("Profile: {}", profile.username).bold());
    println!("  Balance:     {:.2}", profile.balance);
    println!("  Created:     {}", profile.created_at);
    println!("  Spins:       {}", profile.total_spins);
    println!("  Total bets:  {:.2}", profile.total_bets);
    println!("  Total wins:  {:.2}", profile.total_wins);
    println!("  Biggest win: {:.2}", profile.biggest_win);

    let sessions = store.user_sessions(profile.user_id, 10)?;
    if !sessions.is_empty() {
        println!();
        println!("Recent sessions:");
        for session in sessions {
            let ended = session.ended_at.as_deref().unwrap_or("open");
            println!(
                "  #{:<4} {}  spins {:<5} bets {:<10.2} wins {:<10.2} ({})",
                session.session_id, session.started_at, session.spins, session.bets,
                session.wins, ended
            );
        }
    }
    Ok(())
}
