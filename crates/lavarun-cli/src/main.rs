use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use lavarun_core::Level;
use lavarun_session::campaign::{Campaign, LevelResult};
use lavarun_session::config::GameConfig;
use lavarun_session::controller::{PlayerInput, is_grounded};
use lavarun_session::levels::{builtin_pack, load_pack};

const USAGE: &str = "usage: lavarun [--json] [LEVELS.json]";

/// Runs right and jumps whenever it stands on something.
fn runner_policy(level: &Level) -> PlayerInput {
    let grounded = level
        .player()
        .is_some_and(|player| is_grounded(level, player));
    PlayerInput {
        left: false,
        right: true,
        jump: grounded,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut json = false;
    let mut pack_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            },
            other if pack_path.is_none() => pack_path = Some(other.to_string()),
            _ => {
                eprintln!("{USAGE}");
                return ExitCode::from(2);
            },
        }
    }

    let config = GameConfig::load();
    let parser = match config.parser() {
        Ok(parser) => parser,
        Err(e) => {
            tracing::error!("invalid symbol table: {e}");
            return ExitCode::FAILURE;
        },
    };
    let levels = match pack_path {
        Some(path) => match load_pack(Path::new(&path)) {
            Ok(levels) => levels,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            },
        },
        None => builtin_pack(),
    };

    tracing::info!(levels = levels.len(), "Lava Run campaign starting");
    let mut campaign = Campaign::new(levels, parser, config);
    let outcome = campaign.run(&mut runner_policy);

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                tracing::error!("failed to serialize outcome: {e}");
                return ExitCode::FAILURE;
            },
        }
    } else {
        for (index, result) in outcome.levels.iter().enumerate() {
            match result {
                LevelResult::Won { attempts } => {
                    println!("level {}: won after {attempts} attempt(s)", index + 1)
                },
                LevelResult::GaveUp { attempts } => {
                    println!("level {}: gave up after {attempts} attempt(s)", index + 1)
                },
            }
        }
        println!(
            "{} of {} levels won",
            outcome.levels_won(),
            campaign.level_count()
        );
    }

    if outcome.completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
