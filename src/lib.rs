//! Galaga Core - A deterministic arcade shooter simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, formation, projectiles, capture, scoring)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Key-value storage collaborator (memory, file, LocalStorage)
//! - `highscores`: High score scalar on top of persistence
//! - `platform`: Frame clock that feeds fixed simulation steps

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use tuning::{EnemyStats, StageConfig, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, display-synchronized)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Largest delta a single `advance` will integrate
    pub const MAX_DT: f32 = 1.0 / 30.0;

    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Projectile culling margins beyond the field edges
    pub const CULL_MARGIN_X: f32 = 20.0;
    pub const CULL_MARGIN_Y: f32 = 50.0;

    /// Player horizontal travel limits
    pub const PLAYER_LEFT: f32 = 20.0;
    pub const PLAYER_RIGHT: f32 = 380.0;
    /// Player spawn point
    pub const PLAYER_SPAWN_X: f32 = FIELD_WIDTH / 2.0;
    pub const PLAYER_SPAWN_Y: f32 = 560.0;
    /// Player hitbox (square)
    pub const PLAYER_SIZE: f32 = 24.0;
    /// Horizontal offset of each ship in double-ship mode
    pub const DOUBLE_SHIP_OFFSET: f32 = 15.0;

    /// Enemy hitboxes (square)
    pub const ACE_SIZE: f32 = 20.0;
    pub const ENEMY_SIZE: f32 = 16.0;

    /// Projectile hitboxes (square)
    pub const SHOT_SIZE: f32 = 4.0;
    pub const BEAM_SIZE: f32 = 8.0;

    /// Muzzle offsets (player fires up, enemies fire down)
    pub const PLAYER_MUZZLE_OFFSET: f32 = 10.0;
    pub const ENEMY_MUZZLE_OFFSET: f32 = 10.0;

    /// Formation grid
    pub const FORMATION_COLS: u32 = 10;
    pub const FORMATION_SPACING_X: f32 = 32.0;
    pub const FORMATION_SPACING_Y: f32 = 24.0;
    pub const FORMATION_START_X: f32 = 50.0;
    pub const FORMATION_START_Y: f32 = 100.0;
    /// Side-to-side sweep limits (offset from home slots)
    pub const SWEEP_BOUND: f32 = 50.0;

    /// Distance at which a dive waypoint counts as reached
    pub const WAYPOINT_REACHED: f32 = 5.0;
    /// Distance at which a returning enemy snaps back into its slot
    pub const HOME_REACHED: f32 = 10.0;
    /// Diving enemies below this line give up and return
    pub const DIVE_FLOOR: f32 = FIELD_HEIGHT + 50.0;
    /// Waypoint steps per dive path (path has one more point)
    pub const DIVE_PATH_STEPS: usize = 30;
}

/// Sanitize a frame delta: non-finite or negative becomes zero, large stalls
/// are capped at [`consts::MAX_DT`].
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        0.0
    } else {
        dt.min(consts::MAX_DT)
    }
}
