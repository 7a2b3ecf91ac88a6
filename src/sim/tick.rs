//! Fixed timestep simulation tick
//!
//! One call to [`Engine::advance`] runs the whole pipeline in a fixed order:
//! player, projectiles, formation and enemy fire, tractor beams, collisions,
//! capture, end-of-stage checks, snapshot.

use glam::Vec2;

use super::capture::{CaptureSequence, CaptureStep};
use super::engine::Engine;
use super::enemy::EnemyId;
use super::player::Direction;
use super::pool::{Owner, ProjectileKind};
use super::state::{GamePhase, RescueMode};
use crate::clamp_dt;

/// Input intents for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    /// Pause toggle
    pub pause: bool,
    /// Back to a fresh Ready session
    pub restart: bool,
}

impl Engine {
    /// Advance the session by `dt` seconds
    pub fn advance(&mut self, dt: f32, input: &TickInput) {
        let dt = clamp_dt(dt);

        if input.restart {
            self.reset_game();
            self.finish_tick();
            return;
        }

        if input.pause {
            match self.phase {
                GamePhase::Playing => self.pause_game(),
                GamePhase::Paused => self.resume_game(),
                _ => {}
            }
        }

        match self.phase {
            GamePhase::Playing => self.step(dt, input),
            GamePhase::StageClear => self.step_stage_clear(dt),
            GamePhase::Ready | GamePhase::Paused | GamePhase::GameOver => {}
        }

        self.finish_tick();
    }

    fn step(&mut self, dt: f32, input: &TickInput) {
        self.frame_count += 1;
        self.clock += dt;

        // 1. Player and projectiles
        self.player.advance(dt);
        self.pool.advance(dt);
        if self.capture.is_none() {
            if input.left {
                self.player.move_dir(Direction::Left, dt);
            }
            if input.right {
                self.player.move_dir(Direction::Right, dt);
            }
            if input.shoot {
                self.fire_player_shot();
            }
        }

        // 2. Formation and enemy fire
        self.formation.advance(dt, &mut self.rng);
        self.fire_enemy_shots();

        // 3. Tractor beams
        self.deploy_tractor_beams(dt);

        // 4. Collisions (rescue happens inside)
        self.resolve_friendly_hits();
        self.resolve_hostile_hits();
        if self.phase != GamePhase::Playing {
            return;
        }
        self.resolve_beam_contact();

        // 5. Capture sequence
        self.advance_capture(dt);

        // 6. End of stage / end of game
        self.check_end_conditions();
    }

    fn fire_player_shot(&mut self) {
        let in_flight = self
            .pool
            .by_owner(Owner::Player)
            .filter(|(_, p)| p.kind == ProjectileKind::Friendly)
            .count();
        if in_flight >= self.tuning.max_player_shots {
            return;
        }
        if self.player.try_shoot() {
            self.pool.spawn(
                ProjectileKind::Friendly,
                self.player.muzzle(),
                Vec2::new(0.0, -self.tuning.player_shot_speed),
                Owner::Player,
            );
        }
    }

    /// Each enemy whose timer ran out rolls its shoot chance, then aims at the player
    fn fire_enemy_shots(&mut self) {
        let target = self.player.pos;
        let speed = self.tuning.enemy_shot_speed;
        for enemy in self.formation.enemies_mut() {
            if !enemy.can_shoot(&mut self.rng) {
                continue;
            }
            let muzzle = enemy.muzzle();
            let dir = (target - muzzle).normalize_or(Vec2::Y);
            self.pool
                .spawn(ProjectileKind::Hostile, muzzle, dir * speed, Owner::Enemy(enemy.id));
            enemy.reset_shoot_timer(&mut self.rng);
        }
    }

    fn deploy_tractor_beams(&mut self, dt: f32) {
        if self.capture.is_some() || self.player.captured {
            return;
        }
        let chance = self.tuning.beam_rate * dt;
        if chance <= 0.0 {
            return;
        }
        let speed = self.tuning.tractor_beam_speed;
        for enemy in self.formation.enemies() {
            if !enemy.alive || !enemy.can_capture() || !enemy.is_diving() || enemy.holding_captive {
                continue;
            }
            let owner = Owner::Enemy(enemy.id);
            let beam_in_flight = self
                .pool
                .by_owner(owner)
                .any(|(_, p)| p.kind == ProjectileKind::TractorBeam);
            if beam_in_flight || !self.rng.chance(chance) {
                continue;
            }
            self.pool
                .spawn(ProjectileKind::TractorBeam, enemy.muzzle(), Vec2::new(0.0, speed), owner);
        }
    }

    /// Friendly shots against enemies; each shot hits at most one enemy
    fn resolve_friendly_hits(&mut self) {
        let shots: Vec<_> = self
            .pool
            .by_kind(ProjectileKind::Friendly)
            .map(|(handle, p)| (handle, p.bounds(), p.damage))
            .collect();

        for (handle, bounds, damage) in shots {
            let Some(enemy) = self
                .formation
                .enemies_mut()
                .iter_mut()
                .find(|e| e.alive && e.bounds().overlaps(&bounds))
            else {
                continue;
            };

            self.pool.release(handle);
            if !enemy.take_damage(damage) {
                continue;
            }

            let id = enemy.id;
            let points = enemy.points(self.tuning.diving_bonus);
            let had_captive = enemy.holding_captive;
            enemy.holding_captive = false;
            self.on_enemy_destroyed(id, points, had_captive);
        }
    }

    fn on_enemy_destroyed(&mut self, id: EnemyId, points: u32, had_captive: bool) {
        self.award_kill(points);
        self.enemies_killed += 1;

        if self.capture.as_ref().is_some_and(|c| c.ace == id) {
            log::debug!("Capture interrupted, ace {:?} destroyed", id);
            self.capture = None;
        }

        if had_captive {
            self.rescue_player();
        }
    }

    fn rescue_player(&mut self) {
        let bonus = self.tuning.rescue_bonus;
        self.player.rescue();
        self.rescue = RescueMode {
            active: true,
            double_ship: true,
            rescue_bonus: bonus,
        };
        self.add_score(bonus as u64);
        log::debug!("Captured ship rescued, double ship active");
    }

    fn resolve_hostile_hits(&mut self) {
        if !self.player.is_vulnerable() {
            return;
        }
        let player_bounds = self.player.bounds();
        let hits: Vec<_> = self
            .pool
            .by_kind(ProjectileKind::Hostile)
            .filter(|(_, p)| p.bounds().overlaps(&player_bounds))
            .map(|(handle, _)| handle)
            .collect();

        for handle in hits {
            // A non-fatal hit makes the player invulnerable for the rest of the tick
            if !self.player.is_vulnerable() {
                break;
            }
            self.pool.release(handle);
            if self.player.take_damage() {
                self.game_over();
                return;
            }
            self.perfect_stage = false;
            log::debug!("Player hit, {} lives left", self.player.lives);
        }
    }

    fn resolve_beam_contact(&mut self) {
        if self.capture.is_some() || !self.player.is_vulnerable() {
            return;
        }
        let player_bounds = self.player.bounds();
        let contact = self
            .pool
            .by_kind(ProjectileKind::TractorBeam)
            .find(|(_, p)| p.bounds().overlaps(&player_bounds))
            .map(|(handle, p)| (handle, p.owner));

        let Some((handle, owner)) = contact else {
            return;
        };
        self.pool.release(handle);

        let Owner::Enemy(ace) = owner else {
            return;
        };
        // Beam outlived its ace: nothing left to pull the ship in
        if !self.formation.get(ace).is_some_and(|e| e.alive) {
            return;
        }
        log::debug!("Tractor beam from {:?} caught the player", ace);
        self.capture = Some(CaptureSequence::new(ace, &self.tuning));
    }

    fn advance_capture(&mut self, dt: f32) {
        let Some(sequence) = &mut self.capture else {
            return;
        };
        if sequence.advance(dt) == CaptureStep::InProgress {
            return;
        }
        let ace = sequence.ace;
        self.capture = None;

        let held = self
            .formation
            .get_mut(ace)
            .is_some_and(|enemy| enemy.hold_captive());
        if !held {
            return;
        }
        self.player.capture_by_ace();
        self.player.lose_life();
        self.perfect_stage = false;
        log::debug!("Player captured by {:?}, {} lives left", ace, self.player.lives);
    }

    fn check_end_conditions(&mut self) {
        if self.player.lives == 0 && !self.player.alive {
            self.game_over();
            return;
        }
        if self.formation.is_empty() {
            self.complete_stage();
        }
    }

    fn complete_stage(&mut self) {
        if self.perfect_stage {
            self.add_score(self.tuning.perfect_stage_bonus as u64);
        }
        self.add_score(self.tuning.formation_bonus as u64);
        self.capture = None;
        self.phase = GamePhase::StageClear;
        self.stage_clear_remaining = self.tuning.stage_clear_delay;
        log::info!(
            "Stage {} clear (perfect: {}, score {})",
            self.stage,
            self.perfect_stage,
            self.score
        );
    }

    fn step_stage_clear(&mut self, dt: f32) {
        self.clock += dt;
        self.stage_clear_remaining -= dt;
        if self.stage_clear_remaining <= 0.0 {
            self.start_next_stage();
        }
    }

    fn start_next_stage(&mut self) {
        self.enter_stage(self.stage + 1);
        self.phase = GamePhase::Playing;
        log::info!("Stage {} begins", self.stage);
    }

    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.capture = None;
        log::info!("Game over at stage {} with score {}", self.stage, self.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::autopilot::autopilot;
    use crate::sim::curves::MotionCurve;
    use crate::sim::enemy::EnemyKind;
    use crate::tuning::Tuning;

    fn playing(tuning: Tuning) -> Engine {
        let mut engine = Engine::with_tuning(12345, tuning);
        engine.start_game();
        engine
    }

    /// Quiet stage except that any diving ace beams on its first chance
    fn beaming() -> Engine {
        let mut tuning = Tuning::passive();
        tuning.beam_rate = 1_000.0;
        playing(tuning)
    }

    fn first_of(engine: &Engine, kind: EnemyKind) -> EnemyId {
        engine.formation().by_kind(kind).next().unwrap().id
    }

    fn beams(engine: &Engine) -> Vec<(Owner, Vec2)> {
        engine
            .pool()
            .by_kind(ProjectileKind::TractorBeam)
            .map(|(_, p)| (p.owner, p.vel))
            .collect()
    }

    fn tick(engine: &mut Engine) {
        engine.advance(SIM_DT, &TickInput::default());
    }

    #[test]
    fn test_enemy_shot_is_aimed_at_player() {
        let mut engine = playing(Tuning::passive());
        let grunt = first_of(&engine, EnemyKind::Grunt);
        let enemy = engine.formation_mut().get_mut(grunt).unwrap();
        enemy.stats.shoot_chance = 1.0;
        enemy.shoot_timer = 0.0;
        tick(&mut engine);

        let shots: Vec<_> = engine
            .pool()
            .by_owner(Owner::Enemy(grunt))
            .map(|(_, p)| p.clone())
            .collect();
        assert_eq!(shots.len(), 1);
        let shot = &shots[0];
        assert_eq!(shot.kind, ProjectileKind::Hostile);
        let enemy = engine.formation().get(grunt).unwrap();
        assert_eq!(shot.pos, enemy.muzzle());
        let expected = (engine.player().pos - shot.pos).normalize() * engine.tuning().enemy_shot_speed;
        assert!((shot.vel - expected).length() < 1e-3, "{:?} vs {:?}", shot.vel, expected);

        // Timer restarted at 1 / chance, so no second shot right away
        assert!(enemy.shoot_timer >= 1.0);
        tick(&mut engine);
        assert_eq!(engine.pool().by_owner(Owner::Enemy(grunt)).count(), 1);
    }

    #[test]
    fn test_diving_ace_deploys_one_beam_at_a_time() {
        let mut engine = beaming();
        let ace = first_of(&engine, EnemyKind::Ace);
        assert!(engine.formation_mut().get_mut(ace).unwrap().start_dive(MotionCurve::Straight));
        tick(&mut engine);

        let speed = engine.tuning().tractor_beam_speed;
        assert_eq!(beams(&engine), vec![(Owner::Enemy(ace), Vec2::new(0.0, speed))]);

        // Still climbing down the screen: no second beam
        for _ in 0..30 {
            tick(&mut engine);
        }
        assert_eq!(beams(&engine).len(), 1);
    }

    #[test]
    fn test_no_beams_during_capture() {
        let mut engine = beaming();
        let aces: Vec<_> = engine.formation().by_kind(EnemyKind::Ace).map(|e| e.id).collect();
        engine.capture = Some(CaptureSequence::new(aces[1], &engine.tuning));
        assert!(engine.formation_mut().get_mut(aces[0]).unwrap().start_dive(MotionCurve::Straight));
        tick(&mut engine);
        assert!(beams(&engine).is_empty());

        // Nor while the ship is held
        engine.capture = None;
        engine.player.capture_by_ace();
        tick(&mut engine);
        assert!(beams(&engine).is_empty());
    }

    #[test]
    fn test_only_diving_aces_deploy_beams() {
        let mut engine = beaming();
        let grunt = first_of(&engine, EnemyKind::Grunt);
        let escort = first_of(&engine, EnemyKind::Escort);
        assert!(engine.formation_mut().get_mut(grunt).unwrap().start_dive(MotionCurve::Straight));
        assert!(engine.formation_mut().get_mut(escort).unwrap().start_dive(MotionCurve::Straight));

        // Aces stay parked in formation
        for _ in 0..60 {
            tick(&mut engine);
            assert!(beams(&engine).is_empty());
        }
    }

    #[test]
    fn test_ready_ignores_advance() {
        let mut engine = Engine::new(12345);
        let before = engine.snapshot().clone();
        engine.advance(SIM_DT, &TickInput { left: true, shoot: true, ..Default::default() });
        assert_eq!(engine.snapshot(), &before);
        assert_eq!(engine.stats().frame_count, 0);
    }

    #[test]
    fn test_tick_pause() {
        let mut engine = playing(Tuning::default());
        engine.advance(SIM_DT, &TickInput::default());
        assert_eq!(engine.phase(), GamePhase::Playing);

        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        engine.advance(SIM_DT, &input);
        assert_eq!(engine.phase(), GamePhase::Paused);
        let frozen = engine.snapshot().clone();

        // Paused ticks change nothing
        for _ in 0..30 {
            engine.advance(SIM_DT, &TickInput { shoot: true, ..Default::default() });
        }
        assert_eq!(engine.snapshot(), &frozen);

        // Unpause
        engine.advance(SIM_DT, &input);
        assert_eq!(engine.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_shots_in_flight_cap() {
        let mut engine = playing(Tuning::passive());
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        // Held fire for 2/3 s: both shots are still climbing when the
        // cooldown would allow a third
        for _ in 0..40 {
            engine.advance(SIM_DT, &shoot);
        }
        assert_eq!(engine.pool().by_owner(Owner::Player).count(), 2);
        // Ignored intents don't consume the cooldown
        assert!(engine.player().can_shoot);
    }

    #[test]
    fn test_movement_uses_dt() {
        let mut engine = playing(Tuning::passive());
        let x0 = engine.player().pos.x;
        engine.advance(0.02, &TickInput { right: true, ..Default::default() });
        assert!((engine.player().pos.x - (x0 + 200.0 * 0.02)).abs() < 1e-3);

        // Oversized deltas are clamped
        let x1 = engine.player().pos.x;
        engine.advance(1.0, &TickInput { left: true, ..Default::default() });
        assert!((x1 - engine.player().pos.x - 200.0 * MAX_DT).abs() < 1e-3);
    }

    #[test]
    fn test_restart_returns_to_ready() {
        let mut engine = playing(Tuning::default());
        for _ in 0..60 {
            engine.advance(SIM_DT, &TickInput { shoot: true, ..Default::default() });
        }
        engine.advance(SIM_DT, &TickInput { restart: true, ..Default::default() });
        assert_eq!(engine.phase(), GamePhase::Ready);
        assert_eq!(engine.snapshot().score, 0);
        assert!(engine.snapshot().projectiles.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two engines with the same seed and inputs produce identical snapshots
        let mut engine1 = playing(Tuning::default());
        let mut engine2 = playing(Tuning::default());

        for _ in 0..1200 {
            let input1 = autopilot(engine1.snapshot());
            let input2 = autopilot(engine2.snapshot());
            assert_eq!(input1, input2);
            engine1.advance(SIM_DT, &input1);
            engine2.advance(SIM_DT, &input2);
        }

        assert_eq!(engine1.snapshot(), engine2.snapshot());
        assert_eq!(engine1.stats(), engine2.stats());
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut engine1 = Engine::new(1);
        let mut engine2 = Engine::new(2);
        engine1.start_game();
        engine2.start_game();
        for _ in 0..600 {
            engine1.advance(SIM_DT, &TickInput::default());
            engine2.advance(SIM_DT, &TickInput::default());
        }
        assert_ne!(engine1.snapshot().projectiles, engine2.snapshot().projectiles);
    }
}
