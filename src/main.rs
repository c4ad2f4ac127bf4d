//! Dino Runner headless driver
//!
//! Runs the simulation on autopilot against a synthetic display clock and
//! prints a JSON summary. Usage:
//!
//! ```text
//! dino-runner [SETTINGS.json] [--seed N] [--frames N]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use serde::Serialize;

    use dino_runner::highscores::HighScoreEntry;
    use dino_runner::sim::{GameClock, GameEvent, GameState, RenderSnapshot, TickInput, tick};
    use dino_runner::{ConfigError, Settings};

    const DEFAULT_FRAMES: u64 = 20_000;
    const PAUSE_EVERY: u64 = 5000;
    const HIDDEN_MS: f64 = 30_000.0;

    struct Args {
        settings: Option<PathBuf>,
        seed: u64,
        frames: u64,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = Args {
            settings: None,
            seed: 0x5eed,
            frames: DEFAULT_FRAMES,
        };
        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = it.next().ok_or("--seed needs a value")?;
                    args.seed = value.parse().map_err(|_| format!("bad seed: {value}"))?;
                }
                "--frames" => {
                    let value = it.next().ok_or("--frames needs a value")?;
                    args.frames = value.parse().map_err(|_| format!("bad frame count: {value}"))?;
                }
                other if other.starts_with("--") => return Err(format!("unknown option {other}")),
                path => args.settings = Some(PathBuf::from(path)),
            }
        }
        Ok(args)
    }

    #[derive(Serialize)]
    struct Summary {
        seed: u64,
        frames: u64,
        runs: u32,
        jumps: u64,
        achievements: u64,
        high_score: u64,
        leaderboard: Vec<HighScoreEntry>,
        final_frame: RenderSnapshot,
    }

    /// Display timestamps: mostly 60 Hz with jitter and the odd long stall
    fn frame_time(frame: u64) -> f64 {
        let jitter = [16.0, 17.0, 16.0, 18.0, 15.0][(frame % 5) as usize];
        if frame % 997 == 0 { 400.0 } else { jitter }
    }

    fn run(args: Args) -> Result<Summary, ConfigError> {
        let settings = match &args.settings {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        let mut state = GameState::new(settings, args.seed)?;
        let mut clock = GameClock::new();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        let mut now = 0.0f64;
        let mut jumps = 0u64;
        let mut achievements = 0u64;
        clock.advance(now);

        for frame in 1..=args.frames {
            now += frame_time(frame);
            let delta = clock.advance(now);
            // Pause, stay hidden for a while, then resume
            let toggle = matches!(frame % PAUSE_EVERY, 0 | 1) && frame > 1;
            if toggle && state.is_paused() {
                now += HIDDEN_MS;
            }
            let input = TickInput {
                pause: toggle,
                ..input.clone()
            };
            tick(&mut state, &input, delta);
            clock.sync_pause(state.is_paused(), now);

            for event in state.drain_events() {
                match event {
                    GameEvent::Jump => jumps += 1,
                    GameEvent::Achievement { score } => {
                        achievements += 1;
                        log::debug!("Achievement at {score}");
                    }
                    GameEvent::Crash { score } => log::info!("Run {} ended at {score}", state.play_count),
                    GameEvent::ScoreBeat { score } => log::info!("High score {score}"),
                }
            }
        }

        Ok(Summary {
            seed: args.seed,
            frames: args.frames,
            runs: state.play_count,
            jumps,
            achievements,
            high_score: state.high_score(),
            leaderboard: state.high_scores.entries.clone(),
            final_frame: state.snapshot(),
        })
    }

    pub fn main() {
        env_logger::init();
        log::info!("Dino Runner (headless) starting...");

        let args = match parse_args() {
            Ok(args) => args,
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("usage: dino-runner [SETTINGS.json] [--seed N] [--frames N]");
                std::process::exit(2);
            }
        };

        match run(args) {
            Ok(summary) => match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    log::error!("Failed to encode summary: {e}");
                    std::process::exit(1);
                }
            },
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless driver on wasm; hosts embed the library directly
}
