//! Game phase and read-only snapshot types
//!
//! The snapshot is rebuilt at the end of every completed tick from the
//! engine's owned components. It is never the source of truth.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::capture::CaptureSequence;
use super::enemy::Enemy;
use super::player::Player;
use super::pool::Projectile;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Fresh session, waiting for start
    #[default]
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended; only a reset leaves this phase
    GameOver,
    /// Formation destroyed, next stage after a short delay
    StageClear,
}

/// Double-ship state earned by rescuing a captured ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RescueMode {
    pub active: bool,
    pub double_ship: bool,
    /// Bonus paid for the rescue that activated this mode
    pub rescue_bonus: u32,
}

/// Fully denormalized view for rendering/UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub stage: u32,
    pub high_score: u64,
    pub player: Player,
    /// Living enemies only, in id order
    pub enemies: Vec<Enemy>,
    /// Active projectiles only, in slot order
    pub projectiles: Vec<Projectile>,
    pub formation_offset: Vec2,
    pub capture: Option<CaptureSequence>,
    pub rescue: RescueMode,
    /// Simulation clock (seconds) when the current stage began
    pub stage_start_time: f32,
    /// Simulation clock (seconds)
    pub time: f32,
    pub enemies_killed: u32,
    /// No damage taken this stage
    pub perfect_stage: bool,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

/// Diagnostics counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStats {
    pub frame_count: u64,
    pub active_projectiles: usize,
    pub alive_enemies: usize,
    pub stage: u32,
    pub score: u64,
}
