//! Single enemy unit
//!
//! Behaviour is a sum type: only a diving enemy carries a path.
//!
//! ```text
//! Formation --dive--> Diving --path done / below floor--> Returning --home--> Formation
//!                        \--ace captures player--> Captured
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::curves::MotionCurve;
use super::rng::SimRng;
use crate::consts::*;
use crate::tuning::EnemyStats;

/// Stable identity within a formation roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Heavy, rare, carries the tractor beam
    Ace,
    /// Mid-tier ranged unit
    Escort,
    /// Low-tier swarm unit
    Grunt,
}

impl EnemyKind {
    /// Hitbox side length
    pub fn size(self) -> f32 {
        match self {
            EnemyKind::Ace => ACE_SIZE,
            _ => ENEMY_SIZE,
        }
    }
}

/// Behavioural state with per-state data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Parked in its slot, riding the formation offset
    Formation,
    /// Following a sampled curve
    Diving {
        curve: MotionCurve,
        path: Vec<Vec2>,
        index: usize,
    },
    /// Flying straight back to its slot
    Returning,
    /// Ace holding the player's ship: flies back to its slot and stays
    /// parked there, never diving again
    Captured,
}

/// Data-free tag of [`EnemyState`] for snapshots and queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyPhase {
    Formation,
    Diving,
    Returning,
    Captured,
}

impl EnemyState {
    pub fn phase(&self) -> EnemyPhase {
        match self {
            EnemyState::Formation => EnemyPhase::Formation,
            EnemyState::Diving { .. } => EnemyPhase::Diving,
            EnemyState::Returning => EnemyPhase::Returning,
            EnemyState::Captured => EnemyPhase::Captured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub state: EnemyState,
    pub health: i32,
    pub alive: bool,
    /// Formation slot (before the shared offset is applied)
    pub home: Vec2,
    /// Seconds until this enemy may try to fire
    pub shoot_timer: f32,
    /// Ace is holding the player's ship
    pub holding_captive: bool,
    pub stats: EnemyStats,
    #[serde(skip)]
    shoot_jitter: f32,
}

impl Enemy {
    pub fn new(
        id: EnemyId,
        kind: EnemyKind,
        home: Vec2,
        stats: EnemyStats,
        shoot_jitter: f32,
        rng: &mut SimRng,
    ) -> Self {
        Self {
            id,
            kind,
            pos: home,
            vel: Vec2::ZERO,
            state: EnemyState::Formation,
            health: stats.health.max(1),
            alive: true,
            home,
            shoot_timer: rng.range(0.0, shoot_jitter),
            holding_captive: false,
            stats,
            shoot_jitter,
        }
    }

    /// Move according to the current state. `offset` is the formation offset.
    pub fn advance(&mut self, dt: f32, offset: Vec2) {
        if !self.alive {
            return;
        }

        self.shoot_timer -= dt;

        match self.state {
            EnemyState::Formation => {
                self.pos = self.home + offset;
                self.vel = Vec2::ZERO;
            }
            EnemyState::Diving { .. } => self.advance_dive(dt),
            EnemyState::Returning => self.advance_return(dt, offset),
            EnemyState::Captured => self.advance_captive(dt, offset),
        }
    }

    fn advance_dive(&mut self, dt: f32) {
        let EnemyState::Diving { path, index, .. } = &mut self.state else {
            return;
        };

        // Skip every waypoint we're already sitting on
        while *index < path.len() && self.pos.distance(path[*index]) < WAYPOINT_REACHED {
            *index += 1;
        }

        match path.get(*index).copied() {
            Some(target) => {
                let step = self.stats.speed * dt;
                self.vel = (target - self.pos).normalize_or_zero() * self.stats.speed;
                self.pos = move_toward(self.pos, target, step);
                if self.pos.y > DIVE_FLOOR {
                    self.start_returning();
                }
            }
            None => self.start_returning(),
        }
    }

    fn advance_return(&mut self, dt: f32, offset: Vec2) {
        if self.seek_slot(dt, offset) {
            self.state = EnemyState::Formation;
        }
    }

    /// Same seek as a return, but the ace stays Captured once home
    fn advance_captive(&mut self, dt: f32, offset: Vec2) {
        self.seek_slot(dt, offset);
    }

    /// Fly toward the formation slot; true once snapped onto it
    fn seek_slot(&mut self, dt: f32, offset: Vec2) -> bool {
        let slot = self.home + offset;
        if self.pos.distance(slot) < HOME_REACHED {
            self.pos = slot;
            self.vel = Vec2::ZERO;
            return true;
        }
        self.vel = (slot - self.pos).normalize_or_zero() * self.stats.speed;
        self.pos = move_toward(self.pos, slot, self.stats.speed * dt);
        false
    }

    /// Leave the formation along `curve`. Only formation-resident enemies dive.
    pub fn start_dive(&mut self, curve: MotionCurve) -> bool {
        if !self.alive || self.state != EnemyState::Formation {
            return false;
        }
        self.state = EnemyState::Diving {
            curve,
            path: curve.sample_path(self.pos),
            index: 0,
        };
        true
    }

    fn start_returning(&mut self) {
        self.state = EnemyState::Returning;
    }

    /// Returns true when this hit destroyed the enemy
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.alive = false;
            self.vel = Vec2::ZERO;
            return true;
        }
        false
    }

    /// Timer elapsed and the per-kind dice say fire
    pub fn can_shoot(&self, rng: &mut SimRng) -> bool {
        self.alive
            && self.state != EnemyState::Captured
            && self.shoot_timer <= 0.0
            && rng.chance(self.stats.shoot_chance)
    }

    pub fn reset_shoot_timer(&mut self, rng: &mut SimRng) {
        let base = if self.stats.shoot_chance > 0.0 {
            1.0 / self.stats.shoot_chance
        } else {
            0.0
        };
        self.shoot_timer = rng.range(0.0, self.shoot_jitter) + base;
    }

    /// Ace takes the player's ship and heads home with it
    pub fn hold_captive(&mut self) -> bool {
        if !self.stats.can_capture || !self.alive {
            return false;
        }
        self.holding_captive = true;
        self.state = EnemyState::Captured;
        self.vel = Vec2::ZERO;
        true
    }

    /// Score for destroying this enemy right now (divers are worth more)
    pub fn points(&self, diving_bonus: u32) -> u32 {
        match self.state {
            EnemyState::Diving { .. } => self.stats.points + diving_bonus,
            _ => self.stats.points,
        }
    }

    pub fn phase(&self) -> EnemyPhase {
        self.state.phase()
    }

    pub fn is_in_formation(&self) -> bool {
        self.state == EnemyState::Formation
    }

    pub fn is_diving(&self) -> bool {
        matches!(self.state, EnemyState::Diving { .. })
    }

    pub fn can_capture(&self) -> bool {
        self.stats.can_capture
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos, self.kind.size())
    }

    pub fn muzzle(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, ENEMY_MUZZLE_OFFSET)
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }
}

/// Step from `from` toward `to` by at most `max_step`, never overshooting
fn move_toward(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_step || dist == 0.0 {
        to
    } else {
        from + delta / dist * max_step
    }
}
