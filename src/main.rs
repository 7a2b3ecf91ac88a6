//! Galaga Core headless runner
//!
//! Plays a seeded session with the autopilot at a simulated 60 fps frame rate
//! and prints the final stats as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use galaga_core::Tuning;
    use galaga_core::persistence::FileStore;
    use galaga_core::platform::FrameClock;
    use galaga_core::sim::{Engine, GamePhase, autopilot};

    const DEFAULT_SEED: u64 = 12345;
    const DEFAULT_SECONDS: f32 = 120.0;
    /// Wall-clock frame time we pretend to render at
    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Headless autopilot run of a seeded session
    #[derive(Debug, Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// Simulation seed
        #[arg(default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Simulated seconds to play before stopping
        #[arg(default_value_t = DEFAULT_SECONDS)]
        seconds: f32,
        /// JSON balance overrides
        #[arg(long, value_name = "FILE")]
        tuning: Option<PathBuf>,
        /// Where the high score is kept between runs
        #[arg(long = "high-score", value_name = "FILE")]
        high_score: Option<PathBuf>,
    }

    fn load_tuning(args: &Args) -> Tuning {
        let Some(path) = &args.tuning else {
            return Tuning::default();
        };
        match std::fs::read_to_string(path) {
            Ok(json) => match Tuning::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {}, using defaults", path.display(), e);
                    Tuning::default()
                }
            },
            Err(e) => {
                log::warn!("Can't read {}: {}, using defaults", path.display(), e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        env_logger::init();

        let args = Args::parse();
        log::info!("Galaga Core (native) starting, seed {}", args.seed);

        let tuning = load_tuning(&args);
        let mut engine = match &args.high_score {
            Some(path) => Engine::with_store(args.seed, tuning, Box::new(FileStore::new(path))),
            None => Engine::with_tuning(args.seed, tuning),
        };
        engine.start_game();

        let mut clock = FrameClock::new();
        let frames = (args.seconds.max(0.0) / FRAME_DT) as u64;
        let mut stage = engine.stage();
        for _ in 0..frames {
            let input = autopilot(engine.snapshot());
            clock.run_frame(&mut engine, FRAME_DT, &input);

            if engine.stage() != stage {
                stage = engine.stage();
                log::info!("Reached stage {} (score {})", stage, engine.score());
            }
            if engine.phase() == GamePhase::GameOver {
                break;
            }
        }

        let snapshot = engine.snapshot();
        let summary = serde_json::json!({
            "seed": args.seed,
            "phase": snapshot.phase,
            "time": snapshot.time,
            "lives": snapshot.lives,
            "high_score": snapshot.high_score,
            "enemies_killed": snapshot.enemies_killed,
            "stats": engine.stats(),
            "pool": engine.pool().stats(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize summary: {}", e),
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web; nothing to run here
}
