//! Bottle Catch - headless runner
//!
//! Plays one deterministic session on the virtual clock with a simple
//! tracking bot, writing results to the data directory.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::env;

    use bottle_catch::audio::{AudioManager, LogBackend};
    use bottle_catch::consts::{BOX_TOP_OFFSET, TICK_MS, TICKS_PER_SECOND};
    use bottle_catch::persistence::FileStorage;
    use bottle_catch::sim::{GamePhase, GameState, PlayArea, PowerUpKind, TickInput};
    use bottle_catch::{Game, Tuning, platform};

    const DATA_DIR_ENV: &str = "BOTTLE_CATCH_DATA";
    const DEFAULT_DATA_DIR: &str = ".bottle_catch";
    const SEED_ENV: &str = "BOTTLE_CATCH_SEED";

    const AREA_WIDTH: f32 = 800.0;
    const AREA_HEIGHT: f32 = 600.0;
    /// Ten virtual minutes
    const MAX_FRAMES: u64 = TICKS_PER_SECOND as u64 * 600;
    /// A power-up every 20 virtual seconds
    const POWER_UP_EVERY_FRAMES: u64 = TICKS_PER_SECOND as u64 * 20;

    /// Chases the lowest bottle with a capped per-frame speed, so it falls
    /// behind once the levels get fast
    struct Bot {
        box_x: f32,
        /// Max box movement per frame (percent of width)
        speed: f32,
    }

    impl Bot {
        fn new() -> Self {
            Self {
                box_x: 50.0,
                speed: 1.5,
            }
        }

        fn steer(&mut self, state: &GameState, area: &PlayArea) -> TickInput {
            let catch_line = area.height - BOX_TOP_OFFSET;
            let target = state
                .bottles
                .iter()
                .filter(|b| b.y <= catch_line)
                .max_by(|a, b| a.y.total_cmp(&b.y))
                .map(|b| b.x);

            if let Some(x) = target {
                let delta = (x - self.box_x).clamp(-self.speed, self.speed);
                self.box_x = (self.box_x + delta).clamp(0.0, 100.0);
            }
            TickInput { box_x: self.box_x }
        }
    }

    pub fn run() {
        platform::init_logging();
        log::info!("Bottle Catch (headless) starting...");

        let dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let seed = env::var(SEED_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| platform::now_ms() as u64);
        log::info!("Data directory: {}, seed: {}", dir, seed);

        let mut game = Game::new(Tuning::default(), Box::new(FileStorage::new(dir)), seed);
        game.set_play_area(AREA_WIDTH, AREA_HEIGHT);

        let mut audio = AudioManager::new(LogBackend, game.settings().clone());
        audio.init();

        game.open_model_selection();
        game.start("model1", 0);

        let mut bot = Bot::new();
        let mut next_power_up = PowerUpKind::ALL.iter().cycle();

        for frame in 1..=MAX_FRAMES {
            let now = frame * TICK_MS;
            game.advance(now);
            if frame % POWER_UP_EVERY_FRAMES == 0 {
                if let Some(&kind) = next_power_up.next() {
                    game.activate_power_up(kind);
                }
            }

            let input = bot.steer(game.state(), &game.play_area());
            game.frame(&input);

            for event in game.drain_events() {
                audio.handle_event(&event);
            }
            if game.state().phase == GamePhase::GameOver {
                break;
            }
        }

        let state = game.state();
        if state.phase == GamePhase::GameOver {
            log::info!(
                "Game over: score {}, level {}, max combo {}, {} perfect catches",
                state.score,
                state.level + 1,
                state.max_combo,
                state.perfect_catches
            );
        } else {
            log::info!("Time limit reached with score {}", state.score);
            game.stop();
        }
        audio.teardown();

        log::info!("Leaderboard:");
        for (i, entry) in game.high_scores().entries.iter().enumerate() {
            log::info!(
                "{:>2}. {:>7}  level {}  {}s",
                i + 1,
                entry.score,
                entry.level,
                entry.time_secs
            );
        }
        log::info!("Achievements unlocked: {}", game.state().unlocked.len());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser page drives the library directly
    bottle_catch::platform::init_logging();
}
