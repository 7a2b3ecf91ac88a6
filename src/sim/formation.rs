//! Enemy formation
//!
//! Owns every enemy in the stage, the shared sweep offset, and the dive
//! selection policy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::curves::{FormationPattern, MotionCurve};
use super::enemy::{Enemy, EnemyId, EnemyKind};
use super::rng::SimRng;
use crate::consts::*;
use crate::tuning::{EnemyStats, StageConfig, Tuning};

/// Row layout, top to bottom: (kind, enemies in row). Rows are centered on
/// the grid.
const ROSTER: [(EnemyKind, u32); 5] = [
    (EnemyKind::Ace, 4),
    (EnemyKind::Escort, 8),
    (EnemyKind::Escort, 8),
    (EnemyKind::Grunt, 10),
    (EnemyKind::Grunt, 10),
];

/// A scripted override in progress
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActivePattern {
    pattern: FormationPattern,
    elapsed: f32,
    /// Offset when the pattern began
    anchor: Vec2,
}

/// Roster counts for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormationStats {
    pub total: usize,
    pub alive: usize,
    pub in_formation: usize,
    pub diving: usize,
    pub aces: usize,
    pub escorts: usize,
    pub grunts: usize,
}

#[derive(Debug, Clone)]
pub struct Formation {
    enemies: Vec<Enemy>,
    offset: Vec2,
    /// +1 sweeping right, -1 sweeping left
    direction: f32,
    pattern: Option<ActivePattern>,
    stage: StageConfig,
    ace: EnemyStats,
    escort: EnemyStats,
    grunt: EnemyStats,
    sweep_drop: f32,
    shoot_jitter: f32,
}

impl Formation {
    pub fn new(stage: u32, tuning: &Tuning, rng: &mut SimRng) -> Self {
        let mut formation = Self {
            enemies: Vec::new(),
            offset: Vec2::ZERO,
            direction: 1.0,
            pattern: None,
            stage: StageConfig::for_stage(stage, tuning),
            ace: tuning.ace,
            escort: tuning.escort,
            grunt: tuning.grunt,
            sweep_drop: tuning.sweep_drop,
            shoot_jitter: tuning.shoot_timer_jitter,
        };
        formation.recreate(stage, tuning, rng);
        formation
    }

    /// Rebuild the full roster for `stage` with that stage's scaling
    pub fn recreate(&mut self, stage: u32, tuning: &Tuning, rng: &mut SimRng) {
        self.stage = StageConfig::for_stage(stage, tuning);
        self.ace = self.stage.scaled_stats(&tuning.ace);
        self.escort = self.stage.scaled_stats(&tuning.escort);
        self.grunt = self.stage.scaled_stats(&tuning.grunt);
        self.sweep_drop = tuning.sweep_drop;
        self.shoot_jitter = tuning.shoot_timer_jitter;
        self.offset = Vec2::ZERO;
        self.direction = 1.0;
        self.pattern = None;
        self.enemies.clear();

        let mut next_id = 0;
        for (row, &(kind, count)) in ROSTER.iter().enumerate() {
            let y = FORMATION_START_Y + row as f32 * FORMATION_SPACING_Y;
            let start_x = FORMATION_START_X
                + (FORMATION_COLS - count) as f32 / 2.0 * FORMATION_SPACING_X;
            for col in 0..count {
                let home = Vec2::new(start_x + col as f32 * FORMATION_SPACING_X, y);
                let stats = *self.stats_for(kind);
                self.enemies.push(Enemy::new(
                    EnemyId(next_id),
                    kind,
                    home,
                    stats,
                    self.shoot_jitter,
                    rng,
                ));
                next_id += 1;
            }
        }

        log::debug!(
            "Formation for stage {}: {} enemies, sweep {:.0}px/s",
            stage,
            self.enemies.len(),
            self.stage.sweep_speed
        );
    }

    fn stats_for(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Ace => &self.ace,
            EnemyKind::Escort => &self.escort,
            EnemyKind::Grunt => &self.grunt,
        }
    }

    /// Move the formation, then every enemy, then roll for new dives
    pub fn advance(&mut self, dt: f32, rng: &mut SimRng) {
        self.update_offset(dt);
        let offset = self.offset;
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            enemy.advance(dt, offset);
        }
        self.select_divers(dt, rng);
    }

    fn update_offset(&mut self, dt: f32) {
        if let Some(active) = &mut self.pattern {
            active.elapsed += dt;
            if active.elapsed < active.pattern.duration() {
                self.offset = active.anchor + active.pattern.offset_at(active.elapsed);
            } else {
                // Pattern done, sweep picks up from here
                self.pattern = None;
            }
            return;
        }

        self.offset.x += self.direction * self.stage.sweep_speed * dt;
        if self.offset.x > SWEEP_BOUND {
            self.offset.x = SWEEP_BOUND;
            self.direction = -1.0;
            self.offset.y += self.sweep_drop;
        } else if self.offset.x < -SWEEP_BOUND {
            self.offset.x = -SWEEP_BOUND;
            self.direction = 1.0;
            self.offset.y += self.sweep_drop;
        }
    }

    /// Every parked enemy independently rolls for a dive this tick
    fn select_divers(&mut self, dt: f32, rng: &mut SimRng) {
        let chance = self.stage.dive_rate * dt;
        if chance <= 0.0 {
            return;
        }
        let difficulty = self.stage.difficulty;
        for enemy in self.enemies.iter_mut() {
            if !enemy.alive || !enemy.is_in_formation() || !rng.chance(chance) {
                continue;
            }
            let curve = MotionCurve::pick_for(enemy.kind, rng).scale_for_difficulty(difficulty, rng);
            enemy.start_dive(curve);
        }
    }

    /// Send one specific enemy diving with its kind's curve
    pub fn launch_dive(&mut self, id: EnemyId, rng: &mut SimRng) -> bool {
        let difficulty = self.stage.difficulty;
        match self.get_mut(id) {
            Some(enemy) => {
                let curve = MotionCurve::pick_for(enemy.kind, rng).scale_for_difficulty(difficulty, rng);
                enemy.start_dive(curve)
            }
            None => false,
        }
    }

    /// Replace the sweep with a scripted pattern for its duration
    pub fn start_pattern(&mut self, pattern: FormationPattern) {
        self.pattern = Some(ActivePattern {
            pattern,
            elapsed: 0.0,
            anchor: self.offset,
        });
    }

    pub fn active_pattern(&self) -> Option<FormationPattern> {
        self.pattern.map(|p| p.pattern)
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn stage_config(&self) -> &StageConfig {
        &self.stage
    }

    // === Queries ===

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn alive(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    pub fn in_formation(&self) -> impl Iterator<Item = &Enemy> {
        self.alive().filter(|e| e.is_in_formation())
    }

    pub fn diving(&self) -> impl Iterator<Item = &Enemy> {
        self.alive().filter(|e| e.is_diving())
    }

    pub fn by_kind(&self, kind: EnemyKind) -> impl Iterator<Item = &Enemy> {
        self.alive().filter(move |e| e.kind == kind)
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Stage clear trigger
    pub fn is_empty(&self) -> bool {
        self.alive().next().is_none()
    }

    /// Fraction destroyed, 0..=1
    pub fn completion(&self) -> f32 {
        if self.enemies.is_empty() {
            return 1.0;
        }
        let dead = self.enemies.len() - self.alive_count();
        dead as f32 / self.enemies.len() as f32
    }

    /// Box around every living enemy
    pub fn bounds(&self) -> Option<Aabb> {
        self.alive().map(|e| e.bounds()).reduce(|a, b| a.union(&b))
    }

    pub fn stats(&self) -> FormationStats {
        let mut stats = FormationStats {
            total: self.enemies.len(),
            ..Default::default()
        };
        for enemy in self.alive() {
            stats.alive += 1;
            if enemy.is_in_formation() {
                stats.in_formation += 1;
            }
            if enemy.is_diving() {
                stats.diving += 1;
            }
            match enemy.kind {
                EnemyKind::Ace => stats.aces += 1,
                EnemyKind::Escort => stats.escorts += 1,
                EnemyKind::Grunt => stats.grunts += 1,
            }
        }
        stats
    }
}
