//! Platform abstraction layer
//!
//! Turns variable wall-clock frame deltas into fixed simulation steps.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{Engine, TickInput};

/// Longest wall-clock frame we try to catch up on (tab switches, breakpoints)
pub const MAX_FRAME_DT: f32 = 0.1;

/// Fixed-step accumulator
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconsumed time carried into the next frame
    pub fn backlog(&self) -> f32 {
        self.accumulator
    }

    /// Run as many `SIM_DT` steps as `wall_dt` covers, at most `MAX_SUBSTEPS`.
    /// One-shot intents (pause, restart) are only applied on the first step.
    /// Returns the number of steps taken.
    pub fn run_frame(&mut self, engine: &mut Engine, wall_dt: f32, input: &TickInput) -> u32 {
        if wall_dt.is_finite() && wall_dt > 0.0 {
            self.accumulator += wall_dt.min(MAX_FRAME_DT);
        }

        let mut input = *input;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            engine.advance(SIM_DT, &input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.pause = false;
            input.restart = false;
        }

        // Too far behind: drop the backlog instead of spiralling
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    fn engine() -> Engine {
        let mut engine = Engine::new(42);
        engine.start_game();
        engine
    }

    #[test]
    fn test_steps_match_wall_time() {
        let mut clock = FrameClock::new();
        let mut engine = engine();
        let input = TickInput::default();

        // Half a step: nothing runs yet
        assert_eq!(clock.run_frame(&mut engine, SIM_DT * 0.5, &input), 0);
        assert_eq!(clock.run_frame(&mut engine, SIM_DT * 0.6, &input), 1);
        assert_eq!(clock.run_frame(&mut engine, SIM_DT * 2.0, &input), 2);
        assert_eq!(engine.stats().frame_count, 3);
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut clock = FrameClock::new();
        let mut engine = engine();
        let steps = clock.run_frame(&mut engine, 5.0, &TickInput::default());
        assert_eq!(steps, MAX_SUBSTEPS);
        assert!(clock.backlog() < SIM_DT);
    }

    #[test]
    fn test_bad_deltas_are_ignored() {
        let mut clock = FrameClock::new();
        let mut engine = engine();
        let input = TickInput::default();
        assert_eq!(clock.run_frame(&mut engine, -1.0, &input), 0);
        assert_eq!(clock.run_frame(&mut engine, f32::NAN, &input), 0);
        assert_eq!(clock.backlog(), 0.0);
    }

    #[test]
    fn test_pause_applies_once_per_frame() {
        let mut clock = FrameClock::new();
        let mut engine = engine();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        // Three steps in one frame must not toggle pause three times
        clock.run_frame(&mut engine, SIM_DT * 3.0 + 0.001, &pause);
        assert_eq!(engine.phase(), GamePhase::Paused);
    }
}
