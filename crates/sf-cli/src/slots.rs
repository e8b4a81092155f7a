//! Interactive slot machine session

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use crossterm::style::Stylize;
use rand::rngs::StdRng;
use rand::SeedableRng;

use sf_config::GameConfig;
use sf_engine::{DiceRisk, SlotEngine, SpinOutcome, SpinResult};
use sf_store::{Store, UserProfile};

/// Run a slot session against the given config and database
pub fn run(
    config: GameConfig,
    db: &Path,
    user: Option<String>,
    auto: Option<u32>,
    bet: Option<f64>,
) -> Result<()> {
    let store = Store::open(db)?;
    let starting_balance = config.settings.starting_balance;
    let min_bet = config.settings.min_bet;
    let max_bet = config.settings.max_bet;

    let mut engine = SlotEngine::new(config)?;
    engine.set_jackpot_pool(store.jackpot_pool()?);

    let profile: Option<UserProfile> = match &user {
        Some(name) => Some(store.login_or_create(name, starting_balance)?),
        None => None,
    };
    let mut balance = profile.as_ref().map_or(starting_balance, |p| p.balance);
    let session_id = match &profile {
        Some(p) => Some(store.start_session(p.user_id, balance)?),
        None => None,
    };

    match &profile {
        Some(p) => println!("{}", format!("Player: {} | Balance: {balance:.2}", p.username).green()),
        None => println!("{}", format!("Guest mode | Balance: {balance:.2}").green()),
    }
    println!(
        "Target RTP: {:.1}% | House edge: {:.1}%",
        engine.config().rtp.target_rtp,
        engine.config().rtp.house_edge
    );

    let mut risk_rng = StdRng::from_os_rng();
    let mut last_bet = bet.unwrap_or(min_bet).clamp(min_bet, max_bet);

    if let Some(spins) = auto {
        balance = auto_play(&mut engine, &store, balance, last_bet, spins)?;
    } else {
        println!("Commands: bet amount | Enter = repeat last bet | a = auto-play | q = quit");
        loop {
            if balance < min_bet {
                println!("{}", "Balance depleted.".red());
                break;
            }

            let input = prompt(&format!(
                "Bet {min_bet:.0}-{max_bet:.0} (last: {last_bet:.0}): "
            ))?;
            let bet = match input.as_str() {
                "q" | "Q" => break,
                "a" | "A" => {
                    let count: u32 = prompt("Auto spins: ")?.parse().unwrap_or(0);
                    balance = auto_play(&mut engine, &store, balance, last_bet, count)?;
                    continue;
                }
                "" => last_bet,
                other => match other.parse::<f64>() {
                    Ok(value) => value,
                    Err(_) => {
                        println!("{}", "Invalid input".red());
                        continue;
                    }
                },
            };

            if bet > balance {
                println!("{}", "Insufficient balance".red());
                continue;
            }

            last_bet = bet;
            balance -= bet;
            let result = match engine.spin(bet) {
                Ok(result) => result,
                Err(err) => {
                    balance += bet;
                    println!("{}", err.to_string().red());
                    continue;
                }
            };
            store.set_jackpot_pool(result.jackpot_pool)?;

            let mut win = result.outcome.total_win();
            display_spin(&result);

            // Offer the dice-risk game on a plain win.
            if win > 0.0 && matches!(result.outcome, SpinOutcome::Win { .. }) {
                win = offer_dice_risk(win, &mut risk_rng)?;
            }
            balance += win;
            println!("Balance: {balance:.2}");

            if let Some(p) = &profile {
                store.save_balance(p.user_id, balance)?;
            }
        }
    }

    finish_session(&engine, &store, &profile, session_id, balance)?;
    Ok(())
}

/// Non-interactive spin burst; returns the final balance
fn auto_play(
    engine: &mut SlotEngine,
    store: &Store,
    mut balance: f64,
    bet: f64,
    spins: u32,
) -> Result<f64> {
    println!("{}", format!("Auto-play: {spins} spins at {bet:.2} each").cyan());
    for i in 0..spins {
        if balance < bet {
            println!("{}", format!("Balance depleted after {i} spins").red());
            break;
        }
        balance -= bet;
        let result = match engine.spin(bet) {
            Ok(result) => result,
            Err(err) => {
                balance += bet;
                println!("{}", err.to_string().red());
                break;
            }
        };
        store.set_jackpot_pool(result.jackpot_pool)?;

        let win = result.outcome.total_win();
        balance += win;
        if win > bet * 5.0 || (i + 1) % 10 == 0 {
            println!(
                "Spin {:>4}: [{}] win {win:>8.2} | balance {balance:.2}",
                i + 1,
                result.reels.join(" | ")
            );
        }
    }
    let stats = engine.stats();
    println!(
        "{}",
        format!(
            "Auto-play done: {} spins, RTP {:.1}%, hit rate {:.1}%",
            stats.total_spins,
            stats.rtp(),
            stats.hit_rate()
        )
        .cyan()
    );
    Ok(balance)
}

fn display_spin(result: &SpinResult) {
    println!("Jackpot pool: {:.2}", result.jackpot_pool);
    println!("[ {} ]", result.reels.join(" | ").cyan());
    match &result.outcome {
        SpinOutcome::Loss => println!("{}", format!("Loss: -{:.2}", result.bet).red()),
        SpinOutcome::Win { amount, multiplier } => {
            if *multiplier > 1 {
                println!("{}", format!("WIN {amount:.2} (x{multiplier})").green());
            } else {
                println!("{}", format!("WIN {amount:.2}").green());
            }
        }
        SpinOutcome::Jackpot { amount } => {
            println!("{}", format!("JACKPOT! {amount:.2}").yellow().bold());
        }
        SpinOutcome::Bonus(round) => {
            println!("{}", format!("BONUS ROUND: {} free spins", round.spins.len()).yellow());
            for (i, spin) in round.spins.iter().enumerate() {
                println!("  Spin {}: [{}] +{:.2}", i + 1, spin.reels.join(" | "), spin.win);
            }
            println!("{}", format!("Bonus total: {:.2}", round.total_win).green());
        }
    }
}

/// Double-or-nothing prompt loop; returns the final win amount
fn offer_dice_risk(win: f64, rng: &mut StdRng) -> Result<f64> {
    let mut risk = DiceRisk::new(win);
    while risk.can_roll() {
        let answer = prompt(&format!(
            "Risk {:.2} on the dice (8+ doubles)? [y/N]: ",
            risk.stake()
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            break;
        }
        if let Some(roll) = risk.roll(rng) {
            if roll.doubled {
                println!(
                    "{}",
                    format!(
                        "Dice {} + {} = {}: doubled to {:.2}",
                        roll.dice.0, roll.dice.1, roll.total, roll.stake_after
                    )
                    .green()
                );
            } else {
                println!(
                    "{}",
                    format!(
                        "Dice {} + {} = {}: win forfeited",
                        roll.dice.0, roll.dice.1, roll.total
                    )
                    .red()
                );
            }
        }
    }
    Ok(risk.stake())
}

fn finish_session(
    engine: &SlotEngine,
    store: &Store,
    profile: &Option<UserProfile>,
    session_id: Option<i64>,
    balance: f64,
) -> Result<()> {
    let stats = engine.stats();

    if let (Some(p), Some(session_id)) = (profile, session_id) {
        store.end_session(
            session_id,
            balance,
            stats.total_spins as i64,
            stats.total_bet,
            stats.total_win,
        )?;
        store.update_user_stats(
            p.user_id,
            stats.total_spins as i64,
            stats.total_bet,
            stats.total_win,
            stats.biggest_win,
        )?;
        store.save_balance(p.user_id, balance)?;
    }
    if stats.total_spins > 0 {
        store.record_analytics_now(
            engine.config().rtp_engine().theoretical_rtp(),
            stats.rtp(),
            stats.total_spins as i64,
            stats.total_bet,
            stats.total_win,
        )?;
    }

    println!();
    println!("{}", "Session summary".bold());
    println!("  Spins:        {}", stats.total_spins);
    println!("  Total bets:   {:.2}", stats.total_bet);
    println!("  Total wins:   {:.2}", stats.total_win);
    println!("  Biggest win:  {:.2}", stats.biggest_win);
    println!("  Realised RTP: {:.1}%", stats.rtp());
    println!("  Balance:      {balance:.2}");
    let net = stats.net();
    if net >= 0.0 {
        println!("{}", format!("  Session profit: +{net:.2}").green());
    } else {
        println!("{}", format!("  Session loss: {net:.2}").red());
    }
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
