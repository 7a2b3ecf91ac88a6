//! Player ship controller
//!
//! Owns position, lives, invulnerability, shot cooldown and capture state.
//! Never touches the projectile pool: `try_shoot` only says whether the
//! caller may fire.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::tuning::Tuning;

/// Horizontal move intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub speed: f32,
    pub lives: u32,
    pub alive: bool,
    pub invulnerable: bool,
    pub invulnerability_timer: f32,
    pub can_shoot: bool,
    pub shoot_cooldown: f32,
    /// Held by an ace's tractor beam (never alive at the same time)
    pub captured: bool,
    /// Double-ship mode after a rescue
    pub rescue_mode: bool,
    /// Counts down to a fresh ship while captured
    pub respawn_timer: f32,
    #[serde(skip)]
    cooldown_duration: f32,
    #[serde(skip)]
    invulnerability_duration: f32,
    #[serde(skip)]
    respawn_delay: f32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Self::spawn_point(),
            speed: tuning.player_speed,
            lives: tuning.player_lives,
            alive: true,
            invulnerable: false,
            invulnerability_timer: 0.0,
            can_shoot: true,
            shoot_cooldown: 0.0,
            captured: false,
            rescue_mode: false,
            respawn_timer: 0.0,
            cooldown_duration: tuning.shoot_cooldown,
            invulnerability_duration: tuning.invulnerability,
            respawn_delay: tuning.capture_respawn_delay,
        }
    }

    pub fn spawn_point() -> Vec2 {
        Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y)
    }

    /// Tick down timers. A captured ship is replaced once the respawn delay
    /// runs out, as long as lives remain.
    pub fn advance(&mut self, dt: f32) {
        if self.invulnerable {
            self.invulnerability_timer -= dt;
            if self.invulnerability_timer <= 0.0 {
                self.invulnerable = false;
                self.invulnerability_timer = 0.0;
            }
        }

        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt;
            if self.shoot_cooldown <= 0.0 {
                self.shoot_cooldown = 0.0;
                self.can_shoot = true;
            }
        }

        if self.captured && self.lives > 0 {
            self.respawn_timer -= dt;
            if self.respawn_timer <= 0.0 {
                self.respawn();
            }
        }
    }

    /// Slide horizontally, clamped to the player lane
    pub fn move_dir(&mut self, direction: Direction, dt: f32) {
        if !self.alive || self.captured {
            return;
        }
        let step = self.speed * dt;
        self.pos.x = match direction {
            Direction::Left => (self.pos.x - step).max(PLAYER_LEFT),
            Direction::Right => (self.pos.x + step).min(PLAYER_RIGHT),
        };
    }

    /// Start the cooldown if a shot is allowed; caller spawns the projectile
    pub fn try_shoot(&mut self) -> bool {
        if !self.can_shoot || !self.alive || self.captured {
            return false;
        }
        self.can_shoot = false;
        self.shoot_cooldown = self.cooldown_duration;
        true
    }

    pub fn muzzle(&self) -> Vec2 {
        self.pos - Vec2::new(0.0, PLAYER_MUZZLE_OFFSET)
    }

    /// Apply a hit. Returns true when this hit eliminated the player.
    pub fn take_damage(&mut self) -> bool {
        if self.invulnerable || !self.alive {
            return false;
        }

        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.alive = false;
            return true;
        }

        self.invulnerable = true;
        self.invulnerability_timer = self.invulnerability_duration;
        self.reset_position();
        false
    }

    /// Taken by a tractor beam. Life loss is applied separately.
    pub fn capture_by_ace(&mut self) {
        self.captured = true;
        self.alive = false;
        self.respawn_timer = self.respawn_delay;
    }

    /// Lose a life without the hit/invulnerability handling
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    /// Freed by destroying the holding ace: back in play as a double ship
    pub fn rescue(&mut self) {
        self.captured = false;
        self.alive = true;
        self.rescue_mode = true;
        self.respawn_timer = 0.0;
        self.reset_position();
    }

    /// Replacement ship after a capture
    fn respawn(&mut self) {
        self.captured = false;
        self.alive = true;
        self.respawn_timer = 0.0;
        self.invulnerable = true;
        self.invulnerability_timer = self.invulnerability_duration;
        self.reset_position();
        log::debug!("Fresh ship after capture, {} lives left", self.lives);
    }

    pub fn disable_rescue_mode(&mut self) {
        self.rescue_mode = false;
    }

    pub fn add_life(&mut self) {
        self.lives += 1;
    }

    pub fn reset_position(&mut self) {
        self.pos = Self::spawn_point();
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos, PLAYER_SIZE)
    }

    /// Can be hit by shots and beams
    pub fn is_vulnerable(&self) -> bool {
        self.alive && !self.invulnerable && !self.captured
    }

    /// Where to draw the ship(s)
    pub fn ship_positions(&self) -> Vec<Vec2> {
        if self.rescue_mode {
            vec![
                self.pos - Vec2::new(DOUBLE_SHIP_OFFSET, 0.0),
                self.pos + Vec2::new(DOUBLE_SHIP_OFFSET, 0.0),
            ]
        } else {
            vec![self.pos]
        }
    }

    /// Blink phase while invulnerable (10 Hz)
    pub fn is_blinking(&self) -> bool {
        self.invulnerable && ((self.invulnerability_timer * 10.0) as u32) % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(&Tuning::default())
    }

    #[test]
    fn test_move_clamps_to_lane() {
        let mut p = player();
        for _ in 0..200 {
            p.move_dir(Direction::Left, 0.1);
        }
        assert_eq!(p.pos.x, PLAYER_LEFT);
        for _ in 0..200 {
            p.move_dir(Direction::Right, 0.1);
        }
        assert_eq!(p.pos.x, PLAYER_RIGHT);
    }

    #[test]
    fn test_shoot_cooldown() {
        let mut p = player();
        assert!(p.try_shoot());
        assert!(!p.try_shoot());
        p.advance(0.1);
        assert!(!p.try_shoot());
        p.advance(0.2);
        assert!(p.can_shoot);
        assert!(p.try_shoot());
    }

    #[test]
    fn test_non_fatal_hit() {
        let mut p = player();
        p.set_position(Vec2::new(50.0, PLAYER_SPAWN_Y));
        assert!(!p.take_damage());
        assert_eq!(p.lives, 2);
        assert!(p.invulnerable);
        assert_eq!(p.pos, Player::spawn_point());

        // Invulnerable: further hits are ignored
        assert!(!p.take_damage());
        assert_eq!(p.lives, 2);

        p.advance(2.5);
        assert!(!p.invulnerable);
        assert_eq!(p.invulnerability_timer, 0.0);
    }

    #[test]
    fn test_fatal_hit() {
        let mut p = player();
        p.set_lives(1);
        assert!(p.take_damage());
        assert!(!p.alive);
        assert_eq!(p.lives, 0);
        assert!(!p.take_damage());
    }

    #[test]
    fn test_capture_and_rescue_flip_together() {
        let mut p = player();
        p.capture_by_ace();
        assert!(p.captured && !p.alive);
        assert!(!p.is_vulnerable());
        assert!(!p.try_shoot());

        let before = p.pos;
        p.move_dir(Direction::Left, 1.0);
        assert_eq!(p.pos, before);

        p.rescue();
        assert!(!p.captured && p.alive);
        assert!(p.rescue_mode);
        assert_eq!(p.ship_positions().len(), 2);
    }

    #[test]
    fn test_captured_ship_respawns_after_delay() {
        let mut p = player();
        p.capture_by_ace();
        p.lose_life();
        p.advance(1.0);
        assert!(p.captured);
        p.advance(2.5);
        assert!(!p.captured && p.alive);
        assert!(p.invulnerable);
        assert_eq!(p.lives, 2);
    }

    #[test]
    fn test_captured_without_lives_stays_captured() {
        let mut p = player();
        p.set_lives(1);
        p.capture_by_ace();
        p.lose_life();
        p.advance(10.0);
        assert!(p.captured && !p.alive);
    }
}
