//! Data-driven game balance
//!
//! Every gameplay number the simulation uses lives here so a session can be
//! rebalanced (or made deterministic for tests) without touching code.
//! Field geometry that never changes lives in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::sim::EnemyKind;

/// Per-kind enemy balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub health: i32,
    /// Movement speed while diving/returning (pixels/s)
    pub speed: f32,
    /// Base score value
    pub points: u32,
    /// Can deploy a tractor beam
    pub can_capture: bool,
    /// Chance to fire once the shoot timer has elapsed
    pub shoot_chance: f32,
}

/// Complete balance sheet for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_speed: f32,
    pub player_lives: u32,
    pub shoot_cooldown: f32,
    pub invulnerability: f32,
    /// Max friendly shots in flight at once
    pub max_player_shots: usize,

    // === Projectiles ===
    pub player_shot_speed: f32,
    pub enemy_shot_speed: f32,
    pub tractor_beam_speed: f32,

    // === Enemies ===
    pub ace: EnemyStats,
    pub escort: EnemyStats,
    pub grunt: EnemyStats,
    /// Per enemy, per second, chance a formation enemy starts a dive
    pub dive_rate: f32,
    /// Added to `dive_rate` for every stage past the first
    pub dive_rate_per_stage: f32,
    /// Per second chance a diving ace deploys its beam
    pub beam_rate: f32,
    /// Upper bound of the random part of the shoot timer (seconds)
    pub shoot_timer_jitter: f32,

    // === Formation ===
    pub sweep_speed: f32,
    pub sweep_speed_per_stage: f32,
    /// Downward creep each time the sweep reverses
    pub sweep_drop: f32,

    // === Capture ===
    pub beam_deploy_duration: f32,
    pub pull_duration: f32,
    /// Delay before a fresh ship replaces a captured one
    pub capture_respawn_delay: f32,

    // === Scoring ===
    pub diving_bonus: u32,
    pub perfect_stage_bonus: u32,
    pub formation_bonus: u32,
    pub rescue_bonus: u32,
    pub double_ship_multiplier: u32,
    pub extra_life_step: u64,

    // === Flow ===
    pub stage_clear_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 200.0,
            player_lives: 3,
            shoot_cooldown: 0.25,
            invulnerability: 2.0,
            max_player_shots: 2,

            player_shot_speed: 400.0,
            enemy_shot_speed: 200.0,
            tractor_beam_speed: 150.0,

            ace: EnemyStats {
                health: 2,
                speed: 100.0,
                points: 400,
                can_capture: true,
                shoot_chance: 0.3,
            },
            escort: EnemyStats {
                health: 1,
                speed: 120.0,
                points: 160,
                can_capture: false,
                shoot_chance: 0.2,
            },
            grunt: EnemyStats {
                health: 1,
                speed: 150.0,
                points: 50,
                can_capture: false,
                shoot_chance: 0.1,
            },
            dive_rate: 0.03,
            dive_rate_per_stage: 0.006,
            beam_rate: 0.6,
            shoot_timer_jitter: 2.0,

            sweep_speed: 30.0,
            sweep_speed_per_stage: 5.0,
            sweep_drop: 10.0,

            beam_deploy_duration: 0.5,
            pull_duration: 0.5,
            capture_respawn_delay: 3.0,

            diving_bonus: 100,
            perfect_stage_bonus: 10_000,
            formation_bonus: 500,
            rescue_bonus: 1_000,
            double_ship_multiplier: 2,
            extra_life_step: 20_000,

            stage_clear_delay: 2.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning sheet; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Base stats for an enemy kind
    pub fn enemy_stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Ace => &self.ace,
            EnemyKind::Escort => &self.escort,
            EnemyKind::Grunt => &self.grunt,
        }
    }

    /// A tuning sheet where enemies never dive, shoot or beam.
    /// Useful for scripted scenarios and replays driven purely by input.
    pub fn passive() -> Self {
        let mut tuning = Self::default();
        tuning.dive_rate = 0.0;
        tuning.dive_rate_per_stage = 0.0;
        tuning.beam_rate = 0.0;
        for stats in [&mut tuning.ace, &mut tuning.escort, &mut tuning.grunt] {
            stats.shoot_chance = 0.0;
        }
        tuning
    }
}

/// Difficulty knobs derived from the stage number
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub stage: u32,
    /// Multiplier applied to enemy dive/return speed
    pub enemy_speed_scale: f32,
    /// Added to every kind's shoot chance (only if the base chance is nonzero)
    pub shoot_chance_bonus: f32,
    /// Per enemy, per second dive chance
    pub dive_rate: f32,
    /// Formation sweep speed (pixels/s)
    pub sweep_speed: f32,
    /// Curve aggressiveness, 0..=2
    pub difficulty: f32,
}

impl StageConfig {
    const MAX_SPEED_SCALE: f32 = 2.0;
    const MAX_SHOOT_BONUS: f32 = 0.4;
    const MAX_DIFFICULTY: f32 = 2.0;

    pub fn for_stage(stage: u32, tuning: &Tuning) -> Self {
        let stage = stage.max(1);
        let past_first = (stage - 1) as f32;
        Self {
            stage,
            enemy_speed_scale: (1.0 + 0.1 * past_first).min(Self::MAX_SPEED_SCALE),
            shoot_chance_bonus: (0.02 * past_first).min(Self::MAX_SHOOT_BONUS),
            dive_rate: tuning.dive_rate + tuning.dive_rate_per_stage * past_first,
            sweep_speed: tuning.sweep_speed + tuning.sweep_speed_per_stage * stage as f32,
            difficulty: (stage as f32 / 5.0).min(Self::MAX_DIFFICULTY),
        }
    }

    /// Stats for one kind with this stage's scaling applied
    pub fn scaled_stats(&self, base: &EnemyStats) -> EnemyStats {
        let shoot_chance = if base.shoot_chance > 0.0 {
            (base.shoot_chance + self.shoot_chance_bonus).min(1.0)
        } else {
            0.0
        };
        EnemyStats {
            speed: base.speed * self.enemy_speed_scale,
            shoot_chance,
            ..*base
        }
    }
}
