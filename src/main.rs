//! Sleigh Run entry point
//!
//! Headless demo runner: the autopilot plays a run at the fixed timestep,
//! logging notable events, then folds the result into the local score table.
//! A rendering host would drive `sim::tick` the same way with real input.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sleigh_run::consts::SIM_DT_MS;
use sleigh_run::sim::{GameEvent, GamePhase, GameState, Mode, TickInput, tick};
use sleigh_run::{HighScores, Settings};

struct Args {
    seed: u64,
    survival: bool,
    max_ticks: u64,
    data_dir: PathBuf,
}

fn parse_args() -> Args {
    let mut args = Args {
        seed: now_ms() as u64,
        survival: false,
        max_ticks: 60 * 60 * 30, // half an hour of play
        data_dir: PathBuf::from("."),
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                if let Some(v) = iter.next().and_then(|v| v.parse().ok()) {
                    args.seed = v;
                }
            }
            "--survival" => args.survival = true,
            "--max-ticks" => {
                if let Some(v) = iter.next().and_then(|v| v.parse().ok()) {
                    args.max_ticks = v;
                }
            }
            "--data-dir" => {
                if let Some(v) = iter.next() {
                    args.data_dir = PathBuf::from(v);
                }
            }
            other => {
                eprintln!("unknown argument: {other}");
                eprintln!(
                    "usage: sleigh-run [--seed N] [--survival] [--max-ticks N] [--data-dir PATH]"
                );
                std::process::exit(2);
            }
        }
    }
    args
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::BiomeChanged(biome) => log::info!("biome: {}", biome.as_str()),
        GameEvent::LifeLost { remaining } => log::info!("hit! {remaining} lives left"),
        GameEvent::EncounterStarted(kind) => log::info!("encounter started: {kind:?}"),
        GameEvent::EncounterEnded(kind) => log::info!("encounter ended: {kind:?}"),
        GameEvent::FlybyWarning => log::info!("jets inbound"),
        GameEvent::BossSpawned => log::info!("the boss is here"),
        GameEvent::BossAttack(attack) => log::info!("boss attack: {attack:?}"),
        GameEvent::BossHit { hp } => log::info!("boss hit, {hp} hp left"),
        GameEvent::BossDefeated { score } => log::info!("boss down! score {score}"),
        GameEvent::GameOver { score } => log::info!("game over, score {score}"),
        other => log::debug!("{other:?}"),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let settings_path = args.data_dir.join("settings.json");
    let scores_path = args.data_dir.join("highscores.json");
    let mut settings = Settings::load(&settings_path);

    let mode = if args.survival {
        if settings.mode_available(Mode::Survival) {
            Mode::Survival
        } else {
            log::warn!("survival is locked until the campaign boss falls; running campaign");
            Mode::Campaign
        }
    } else {
        Mode::Campaign
    };

    log::info!("seed {} mode {}", args.seed, mode.as_str());
    let mut state = GameState::new(args.seed, mode);
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut ticks = 0u64;
    while ticks < args.max_ticks {
        tick(&mut state, &input, SIM_DT_MS);
        ticks += 1;
        for event in &state.events {
            report(event);
        }
        if state.is_over() {
            break;
        }
    }

    let outcome = match state.phase {
        GamePhase::Won => "won",
        GamePhase::GameOver => "game over",
        _ => "stopped",
    };
    println!(
        "{}: {} presents delivered, {} houses passed, {:.1}s played",
        outcome,
        state.score,
        state.houses_passed,
        state.time_ticks as f32 * SIM_DT_MS / 1000.0
    );

    if state.phase == GamePhase::Won && !settings.survival_unlocked {
        settings.survival_unlocked = true;
        settings.save(&settings_path);
    }

    // Terminal runs hand their score over exactly once
    if state.is_over() && !state.score_submitted {
        state.score_submitted = true;
        let mut scores = HighScores::load(&scores_path);
        if let Some(rank) = scores.add_score(&settings.player_name, state.score, mode, now_ms()) {
            println!("new high score, rank {rank}");
            scores.save(&scores_path);
        }
    }
}
