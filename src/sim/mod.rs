//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only, no wall clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID / pool slot)
//! - No rendering, input or storage backends

pub mod autopilot;
pub mod capture;
pub mod collision;
pub mod curves;
pub mod enemy;
pub mod engine;
pub mod formation;
pub mod player;
pub mod pool;
pub mod rng;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use capture::{CapturePhase, CaptureSequence, CaptureStep};
pub use collision::Aabb;
pub use curves::{FormationPattern, MotionCurve};
pub use enemy::{Enemy, EnemyId, EnemyKind, EnemyPhase, EnemyState};
pub use engine::Engine;
pub use formation::{Formation, FormationStats};
pub use player::{Direction, Player};
pub use pool::{Owner, PoolStats, Projectile, ProjectileHandle, ProjectileKind, ProjectilePool};
pub use rng::SimRng;
pub use state::{EngineStats, GamePhase, GameState, RescueMode};
pub use tick::TickInput;
