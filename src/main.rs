//! Vaultbreak - demo entry point
//!
//! Runs the engine against in-memory collaborators and a small roster of
//! players, with a command loop for driving attacks, defenses and training
//! from a terminal. The real deployment replaces this loop with the chat
//! platform's command layer.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use vaultbreak::core::{CommunityId, Discipline, Result, UserId};
use vaultbreak::engine::{Engine, EngineDeps, EngineEvent};
use vaultbreak::history::{HistoryStore, MemoryHistory};
use vaultbreak::ledger::{Balance, Ledger, MemoryLedger};
use vaultbreak::items::NoModifiers;
use vaultbreak::outcome::DefenseChoice;
use vaultbreak::settings::{MemorySettingsRepository, SettingsRepository, TomlSettingsRepository};

const COMMUNITY: CommunityId = CommunityId(1);
const ROSTER: [(&str, u64); 3] = [("alice", 1), ("bob", 2), ("carol", 3)];

#[derive(Parser, Debug)]
#[command(name = "vaultbreak", about = "Adversarial economy engine demo")]
struct Args {
    /// Fixed RNG seed for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,
    /// Directory of per-community settings TOML files; in-memory when absent
    #[arg(long)]
    settings_dir: Option<std::path::PathBuf>,
    /// Shrink windows and cooldowns so a demo session moves quickly
    #[arg(long, default_value_t = true)]
    fast: bool,
}

fn lookup(name: &str) -> Option<UserId> {
    ROSTER
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| UserId(*id))
}

fn name_of(user: UserId) -> &'static str {
    ROSTER
        .iter()
        .find(|(_, id)| *id == user.0)
        .map(|(n, _)| *n)
        .unwrap_or("?")
}

fn parse_discipline(text: &str) -> Option<Discipline> {
    match text {
        "rob" => Some(Discipline::Rob),
        "hack" => Some(Discipline::Hack),
        _ => None,
    }
}

fn render(event: &EngineEvent) {
    match event {
        EngineEvent::RobAnnounced {
            attacker,
            target,
            window_ms,
            ..
        } => println!(
            "[!] {} is robbing {} - {}s to defend (defend {} flee|fight|alarm)",
            name_of(*attacker),
            name_of(*target),
            window_ms / 1000,
            name_of(*target),
        ),
        EngineEvent::HackStarted {
            attacker, target, ..
        } => println!(
            "[!] {} is hacking {} (counter {})",
            name_of(*attacker),
            name_of(*target),
            name_of(*target),
        ),
        EngineEvent::HackProgress {
            target,
            progress,
            counter_chance,
            ..
        } => println!(
            "    {}'s firewall: {}% breached (counter chance {}%)",
            name_of(*target),
            progress,
            counter_chance,
        ),
        EngineEvent::DefenseOutcome {
            target,
            choice,
            success,
            consolation,
            ..
        } => {
            let how = choice.map(|c| c.as_str()).unwrap_or("counter-virus");
            if *success {
                println!("[+] {} defended with {} (+{})", name_of(*target), how, consolation);
            } else {
                println!("[-] {}'s {} failed", name_of(*target), how);
            }
        }
        EngineEvent::Resolved {
            outcome,
            xp_awarded,
            level_up,
            ..
        } => {
            let verb = if outcome.success { "stole" } else { "was fined" };
            println!(
                "[=] {} {} {} ({} on {}){}{}",
                name_of(outcome.attacker),
                verb,
                outcome.amount,
                outcome.discipline,
                name_of(outcome.target),
                if *xp_awarded > 0 {
                    format!(" +{}xp", xp_awarded)
                } else {
                    " (no xp: farming)".to_string()
                },
                if *level_up { " LEVEL UP" } else { "" },
            );
        }
        EngineEvent::TraceWindowOpened {
            target, window_ms, ..
        } => println!(
            "[?] {} can trace the attacker for {}s (trace {})",
            name_of(*target),
            window_ms / 1000,
            name_of(*target),
        ),
        EngineEvent::TraceResolved {
            target,
            success,
            recovered,
            ..
        } => {
            if *success {
                println!("[+] {} traced the attacker and recovered {}", name_of(*target), recovered);
            } else {
                println!("[-] {}'s trace went nowhere", name_of(*target));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "vaultbreak=info".to_string()),
        )
        .init();

    let args = Args::parse();

    let ledger = Arc::new(MemoryLedger::new());
    for (_, id) in ROSTER {
        ledger.open_account(COMMUNITY, UserId(id), Balance::new(10_000, 25_000));
    }

    let history = Arc::new(MemoryHistory::new());
    let settings_repo: Arc<dyn SettingsRepository> = match &args.settings_dir {
        Some(dir) => Arc::new(TomlSettingsRepository::new(dir.clone())),
        None => Arc::new(MemorySettingsRepository::new()),
    };
    let engine = Engine::new(EngineDeps {
        ledger: ledger.clone() as Arc<dyn Ledger>,
        modifiers: Arc::new(NoModifiers),
        history: history.clone() as Arc<dyn HistoryStore>,
        settings: settings_repo,
        clock: Arc::new(vaultbreak::core::SystemClock),
        rng_seed: args.seed,
    });

    if args.fast {
        engine.settings().update(COMMUNITY, |s| {
            s.rob.cooldown_secs = 5;
            s.rob.protection_secs = 5;
            s.rob.decision_window_ms = 10_000;
            s.hack.cooldown_secs = 5;
            s.hack.protection_secs = 5;
            s.hack.tick_interval_ms = 2_000;
            s.hack.trace_window_ms = 10_000;
        })?;
    }

    // Render engine events as they happen
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            render(&event);
        }
    });

    println!("=== VAULTBREAK ===");
    println!("Players: alice, bob, carol (10k cash / 25k bank each)");
    println!();
    println!("Commands:");
    println!("  rob <attacker> <target>      hack <attacker> <target>");
    println!("  defend <user> <flee|fight|alarm>");
    println!("  counter <user>               trace <user>");
    println!("  train <user> <rob|hack>      claim <user> <rob|hack>");
    println!("  bal                          stats <user> <rob|hack>");
    println!("  quit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let outcome = match parts.as_slice() {
            ["quit"] | ["q"] => break,
            ["rob", a, t] => match (lookup(a), lookup(t)) {
                (Some(a), Some(t)) => engine
                    .begin_rob(COMMUNITY, a, t)
                    .map(|ticket| println!("    odds: {:.1}%", ticket.success_rate)),
                _ => {
                    println!("unknown player");
                    continue;
                }
            },
            ["hack", a, t] => match (lookup(a), lookup(t)) {
                (Some(a), Some(t)) => engine
                    .begin_hack(COMMUNITY, a, t)
                    .map(|ticket| println!("    odds: {:.1}%", ticket.success_rate)),
                _ => {
                    println!("unknown player");
                    continue;
                }
            },
            ["defend", u, choice] => {
                let choice = match *choice {
                    "flee" => DefenseChoice::Flee,
                    "fight" => DefenseChoice::Fight,
                    "alarm" => DefenseChoice::Alarm,
                    _ => {
                        println!("pick flee, fight or alarm");
                        continue;
                    }
                };
                lookup(u)
                    .map(|u| engine.submit_rob_defense(COMMUNITY, u, choice))
                    .unwrap_or(Ok(()))
            }
            ["counter", u] => lookup(u)
                .map(|u| engine.submit_hack_counter(COMMUNITY, u))
                .unwrap_or(Ok(())),
            ["trace", u] => lookup(u)
                .map(|u| engine.submit_trace(COMMUNITY, u))
                .unwrap_or(Ok(())),
            ["train", u, d] => match (lookup(u), parse_discipline(d)) {
                (Some(u), Some(d)) => engine.start_training(COMMUNITY, u, d).map(|receipt| {
                    println!(
                        "    training to level {} for {} ({}s)",
                        receipt.target_level, receipt.cost, receipt.duration_secs
                    )
                }),
                _ => {
                    println!("usage: train <user> <rob|hack>");
                    continue;
                }
            },
            ["claim", u, d] => match (lookup(u), parse_discipline(d)) {
                (Some(u), Some(d)) => {
                    println!("    {:?}", engine.check_training(COMMUNITY, u, d));
                    continue;
                }
                _ => {
                    println!("usage: claim <user> <rob|hack>");
                    continue;
                }
            },
            ["bal"] => {
                for (name, id) in ROSTER {
                    let b = ledger.balance(COMMUNITY, UserId(id))?;
                    println!("    {:<6} cash {:>8}  bank {:>8}", name, b.liquid, b.reserve);
                }
                continue;
            }
            ["stats", u, d] => match (lookup(u), parse_discipline(d)) {
                (Some(u), Some(d)) => {
                    let stats = history.stats(COMMUNITY, u, d)?;
                    println!("    {}", serde_json::to_string_pretty(&stats)?);
                    continue;
                }
                _ => {
                    println!("usage: stats <user> <rob|hack>");
                    continue;
                }
            },
            [] => continue,
            _ => {
                println!("unrecognized command");
                continue;
            }
        };
        if let Err(e) = outcome {
            println!("    {}", e);
        }
    }

    Ok(())
}
