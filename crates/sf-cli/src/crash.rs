//! Interactive crash game session

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::style::Stylize;
use rand::rngs::StdRng;
use rand::SeedableRng;

use sf_crash::{resolve, CrashConfig, CrashOutcome, CrashRound, RoundState};

/// Multiplier climb is animated at this tick rate
const TICK_DELAY: Duration = Duration::from_millis(10);

/// Run crash rounds; fully non-interactive when bet and target are given
pub fn run(bet: Option<f64>, target: Option<f64>, rounds: Option<u32>) -> Result<()> {
    let config = CrashConfig::default();
    let mut rng = StdRng::from_os_rng();
    let mut balance = config.starting_balance;

    println!("{}", "Welcome to the crash game".bold());
    println!("Balance: {balance:.2}");

    if let (Some(bet), Some(target)) = (bet, target) {
        for round in 0..rounds.unwrap_or(1) {
            if balance < bet {
                println!("{}", "Balance depleted.".red());
                break;
            }
            let outcome = resolve(&mut rng, &config, bet, target)?;
            balance += outcome.net;
            print!("Round {:>3}: ", round + 1);
            report(&outcome, balance);
        }
        println!("Final balance: {balance:.2}");
        return Ok(());
    }

    loop {
        if balance <= 0.0 {
            println!("{}", "Game over, no balance left.".red());
            break;
        }

        let input = prompt(&format!("Bet (balance {balance:.2}, q to quit): "))?;
        if input.eq_ignore_ascii_case("q") {
            break;
        }
        let Ok(bet) = input.parse::<f64>() else {
            println!("{}", "Invalid bet".red());
            continue;
        };
        if bet <= 0.0 || bet > balance {
            println!("{}", "Bet must be positive and within balance".red());
            continue;
        }

        let target = match prompt("Target multiplier (>1.0): ")?.parse::<f64>() {
            Ok(value) if value > 1.0 => value,
            _ => {
                println!("{}", "Invalid target".red());
                continue;
            }
        };

        let mut round = CrashRound::new(&mut rng, &config, bet)?;
        round.set_target(target)?;
        round.start();

        // Animated climb until cashout or crash.
        loop {
            let state = round.tick();
            print!("\rMultiplier: {:.2}x   ", round.multiplier());
            io::stdout().flush()?;
            if state != RoundState::Flying {
                println!();
                break;
            }
            thread::sleep(TICK_DELAY);
        }

        if let Some(outcome) = round.outcome() {
            balance += outcome.net;
            report(&outcome, balance);
        }
    }

    println!("Final balance: {balance:.2}");
    Ok(())
}

fn report(outcome: &CrashOutcome, balance: f64) {
    match outcome.cashed_out_at {
        Some(at) => println!(
            "{}",
            format!(
                "Cashed out at {at:.2}x (crash {:.2}x): +{:.2} | balance {balance:.2}",
                outcome.crash_point, outcome.net
            )
            .green()
        ),
        None => println!(
            "{}",
            format!(
                "Crashed at {:.2}x: {:.2} | balance {balance:.2}",
                outcome.crash_point, outcome.net
            )
            .red()
        ),
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
