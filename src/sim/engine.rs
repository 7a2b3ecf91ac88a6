//! Simulation engine
//!
//! Composition root: owns the player, the formation, the projectile pool and
//! the random source, and is the only thing that mutates them. Callers drive
//! it with [`Engine::advance`] (see `tick.rs`) and read it through
//! [`Engine::snapshot`].

use super::capture::CaptureSequence;
use super::curves::FormationPattern;
use super::formation::Formation;
use super::player::Player;
use super::pool::ProjectilePool;
use super::rng::SimRng;
use super::state::{EngineStats, GamePhase, GameState, RescueMode};
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::tuning::Tuning;

#[derive(Debug)]
pub struct Engine {
    pub(super) tuning: Tuning,
    pub(super) seed: u64,
    pub(super) rng: SimRng,
    pub(super) player: Player,
    pub(super) formation: Formation,
    pub(super) pool: ProjectilePool,
    pub(super) capture: Option<CaptureSequence>,
    pub(super) phase: GamePhase,
    pub(super) score: u64,
    pub(super) stage: u32,
    pub(super) high_score: HighScore,
    pub(super) rescue: RescueMode,
    /// Simulation clock, seconds of Playing/StageClear time
    pub(super) clock: f32,
    pub(super) stage_start_time: f32,
    pub(super) enemies_killed: u32,
    pub(super) perfect_stage: bool,
    /// Seconds left before StageClear rolls into the next stage
    pub(super) stage_clear_remaining: f32,
    pub(super) extra_lives_awarded: u64,
    pub(super) frame_count: u64,
    snapshot: GameState,
}

impl Engine {
    /// Stock balance, high score kept in memory only
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self::with_high_score(seed, tuning, HighScore::in_memory())
    }

    /// High score read from (and written back to) `store`
    pub fn with_store(seed: u64, tuning: Tuning, store: Box<dyn KeyValueStore>) -> Self {
        Self::with_high_score(seed, tuning, HighScore::load(store))
    }

    fn with_high_score(seed: u64, tuning: Tuning, high_score: HighScore) -> Self {
        let mut rng = SimRng::new(seed);
        let player = Player::new(&tuning);
        let formation = Formation::new(1, &tuning, &mut rng);
        let mut engine = Self {
            tuning,
            seed,
            rng,
            snapshot: GameState {
                phase: GamePhase::Ready,
                score: 0,
                lives: player.lives,
                stage: 1,
                high_score: high_score.best(),
                player: player.clone(),
                enemies: Vec::new(),
                projectiles: Vec::new(),
                formation_offset: formation.offset(),
                capture: None,
                rescue: RescueMode::default(),
                stage_start_time: 0.0,
                time: 0.0,
                enemies_killed: 0,
                perfect_stage: true,
            },
            player,
            formation,
            pool: ProjectilePool::new(),
            capture: None,
            phase: GamePhase::Ready,
            score: 0,
            stage: 1,
            high_score,
            rescue: RescueMode::default(),
            clock: 0.0,
            stage_start_time: 0.0,
            enemies_killed: 0,
            perfect_stage: true,
            stage_clear_remaining: 0.0,
            extra_lives_awarded: 0,
            frame_count: 0,
        };
        engine.refresh_snapshot();
        log::info!("Engine ready (seed {}, high score {})", seed, engine.high_score.best());
        engine
    }

    // === Commands ===

    /// Ready -> Playing. Has no effect in any other phase.
    pub fn start_game(&mut self) {
        if self.phase == GamePhase::Ready {
            self.phase = GamePhase::Playing;
            self.stage_start_time = self.clock;
            log::info!("Game started");
            self.refresh_snapshot();
        }
    }

    /// Playing -> Paused; idempotent
    pub fn pause_game(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            self.refresh_snapshot();
        }
    }

    /// Paused -> Playing; idempotent
    pub fn resume_game(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            self.refresh_snapshot();
        }
    }

    /// Back to a fresh Ready session with the original seed. The high score
    /// survives.
    pub fn reset_game(&mut self) {
        self.rng = SimRng::new(self.seed);
        self.player = Player::new(&self.tuning);
        self.formation.recreate(1, &self.tuning, &mut self.rng);
        self.pool.clear();
        self.capture = None;
        self.phase = GamePhase::Ready;
        self.score = 0;
        self.stage = 1;
        self.rescue = RescueMode::default();
        self.clock = 0.0;
        self.stage_start_time = 0.0;
        self.enemies_killed = 0;
        self.perfect_stage = true;
        self.stage_clear_remaining = 0.0;
        self.extra_lives_awarded = 0;
        self.frame_count = 0;
        self.refresh_snapshot();
        log::info!("Game reset");
    }

    /// Hand the formation a scripted motion (attack swoop, retreat, ...)
    pub fn start_formation_pattern(&mut self, pattern: FormationPattern) {
        self.formation.start_pattern(pattern);
    }

    /// Jump to a stage with a freshly built formation. Stage bookkeeping is
    /// reset exactly as on a normal stage rollover; the phase is left alone.
    pub fn set_stage(&mut self, stage: u32) {
        self.enter_stage(stage.max(1));
        self.refresh_snapshot();
    }

    /// Fresh roster, empty field, clean per-stage counters
    pub(super) fn enter_stage(&mut self, stage: u32) {
        self.stage = stage;
        self.formation.recreate(stage, &self.tuning, &mut self.rng);
        self.player.reset_position();
        self.player.disable_rescue_mode();
        self.rescue = RescueMode::default();
        self.pool.clear();
        self.capture = None;
        self.enemies_killed = 0;
        self.perfect_stage = true;
        self.stage_clear_remaining = 0.0;
        self.stage_start_time = self.clock;
    }

    // === Reads ===

    /// State as of the end of the last completed tick
    pub fn snapshot(&self) -> &GameState {
        &self.snapshot
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            frame_count: self.frame_count,
            active_projectiles: self.pool.active_count(),
            alive_enemies: self.formation.alive_count(),
            stage: self.stage,
            score: self.score,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }

    pub fn capture(&self) -> Option<&CaptureSequence> {
        self.capture.as_ref()
    }

    // === Scripting/debug access ===

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn formation_mut(&mut self) -> &mut Formation {
        &mut self.formation
    }

    pub fn pool_mut(&mut self) -> &mut ProjectilePool {
        &mut self.pool
    }

    // === Scoring ===

    /// Enemy kill points, doubled while the double ship is active
    pub(super) fn award_kill(&mut self, points: u32) {
        let multiplier = if self.rescue.double_ship {
            self.tuning.double_ship_multiplier as u64
        } else {
            1
        };
        self.add_score(points as u64 * multiplier);
    }

    /// Flat score addition with extra-life and high-score bookkeeping
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);

        let step = self.tuning.extra_life_step;
        if step > 0 {
            while self.score >= (self.extra_lives_awarded + 1).saturating_mul(step) {
                self.extra_lives_awarded += 1;
                self.player.add_life();
                log::debug!(
                    "Extra life at {} ({} lives)",
                    self.score,
                    self.player.lives
                );
            }
        }

        self.high_score.submit(self.score);
    }

    // === Snapshot ===

    pub(super) fn refresh_snapshot(&mut self) {
        self.snapshot = GameState {
            phase: self.phase,
            score: self.score,
            lives: self.player.lives,
            stage: self.stage,
            high_score: self.high_score.best(),
            player: self.player.clone(),
            enemies: self.formation.alive().cloned().collect(),
            projectiles: self.pool.active_projectiles(),
            formation_offset: self.formation.offset(),
            capture: self.capture.clone(),
            rescue: self.rescue,
            stage_start_time: self.stage_start_time,
            time: self.clock,
            enemies_killed: self.enemies_killed,
            perfect_stage: self.perfect_stage,
        };
    }

    /// End of tick: publish the snapshot, then persist a new record.
    /// Persistence runs last so a failing store can't leave a half-updated view.
    pub(super) fn finish_tick(&mut self) {
        self.refresh_snapshot();
        self.high_score.flush();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::pool::{Owner, ProjectileKind};

    #[test]
    fn test_new_engine_is_ready() {
        let engine = Engine::new(1);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, GamePhase::Ready);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.stage, 1);
        assert_eq!(snap.enemies.len(), 40);
        assert!(snap.projectiles.is_empty());
        assert!(snap.perfect_stage);
    }

    #[test]
    fn test_phase_commands_are_idempotent() {
        let mut engine = Engine::new(1);
        engine.pause_game();
        assert_eq!(engine.phase(), GamePhase::Ready);

        engine.start_game();
        engine.resume_game();
        assert_eq!(engine.phase(), GamePhase::Playing);

        engine.pause_game();
        engine.pause_game();
        assert_eq!(engine.phase(), GamePhase::Paused);
        assert_eq!(engine.snapshot().phase, GamePhase::Paused);

        engine.start_game();
        assert_eq!(engine.phase(), GamePhase::Paused);

        engine.resume_game();
        assert_eq!(engine.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_extra_life_ladder() {
        let mut engine = Engine::new(1);
        engine.add_score(19_999);
        assert_eq!(engine.player().lives, 3);
        engine.add_score(1);
        assert_eq!(engine.player().lives, 4);
        // Crossing two thresholds at once grants two lives
        engine.add_score(40_000);
        assert_eq!(engine.player().lives, 6);
        engine.add_score(100);
        assert_eq!(engine.player().lives, 6);
    }

    #[test]
    fn test_extra_life_ladder_ignores_lost_lives() {
        let mut engine = Engine::new(1);
        engine.add_score(20_000);
        assert_eq!(engine.player().lives, 4);
        engine.player_mut().set_lives(1);
        // The next life is still at 40k, not recomputed from current lives
        engine.add_score(5_000);
        assert_eq!(engine.player().lives, 1);
        engine.add_score(15_000);
        assert_eq!(engine.player().lives, 2);
    }

    #[test]
    fn test_high_score_tracks_max() {
        let mut store = MemoryStore::new();
        store.set(HighScore::STORAGE_KEY, "1000").unwrap();
        let mut engine = Engine::with_store(1, Tuning::default(), Box::new(store));
        assert_eq!(engine.high_score(), 1000);
        engine.add_score(600);
        assert_eq!(engine.high_score(), 1000);
        engine.add_score(600);
        assert_eq!(engine.high_score(), 1200);
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut engine = Engine::new(1);
        engine.start_game();
        engine.add_score(5_000);
        engine.reset_game();
        assert_eq!(engine.phase(), GamePhase::Ready);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.high_score(), 5_000);
        assert_eq!(engine.snapshot().high_score, 5_000);
        assert_eq!(engine.formation().alive_count(), 40);
    }

    #[test]
    fn test_set_stage_rebuilds_formation() {
        let mut engine = Engine::new(1);
        engine.set_stage(7);
        assert_eq!(engine.stage(), 7);
        assert_eq!(engine.formation().stage_config().stage, 7);
        assert_eq!(engine.stats().alive_enemies, 40);
    }

    #[test]
    fn test_set_stage_resets_stage_state() {
        let mut engine = Engine::with_tuning(1, Tuning::passive());
        engine.start_game();
        for _ in 0..30 {
            engine.advance(crate::consts::SIM_DT, &Default::default());
        }
        let ace = engine.formation().by_kind(EnemyKind::Ace).next().unwrap().id;
        engine.capture = Some(CaptureSequence::new(ace, &engine.tuning));
        engine
            .pool
            .spawn(ProjectileKind::Hostile, Vec2::new(100.0, 100.0), Vec2::ZERO, Owner::Enemy(ace));
        engine.enemies_killed = 5;
        engine.perfect_stage = false;

        engine.set_stage(3);
        assert_eq!(engine.stage(), 3);
        assert!(engine.capture().is_none());
        assert_eq!(engine.pool().active_count(), 0);
        assert_eq!(engine.stage_start_time, engine.clock);
        assert!(engine.clock > 0.0);

        let snap = engine.snapshot();
        assert!(snap.capture.is_none());
        assert!(snap.projectiles.is_empty());
        assert!(snap.perfect_stage);
        assert_eq!(snap.enemies_killed, 0);
        assert_eq!(snap.stage, 3);
        assert_eq!(snap.phase, GamePhase::Playing);
    }

    #[test]
    fn test_formation_pattern_replaces_sweep() {
        let mut engine = Engine::with_tuning(1, Tuning::passive());
        engine.start_game();
        engine.start_formation_pattern(FormationPattern::Retreat);
        assert_eq!(engine.formation().active_pattern(), Some(FormationPattern::Retreat));

        // Retreat only climbs; the sweep would have moved sideways
        for _ in 0..30 {
            engine.advance(crate::consts::SIM_DT, &Default::default());
        }
        let offset = engine.snapshot().formation_offset;
        assert_eq!(offset.x, 0.0);
        assert!((offset.y + 20.0).abs() < 1.0, "offset {:?}", offset);

        // Pattern runs out after 2 s and the sweep takes over
        for _ in 0..100 {
            engine.advance(crate::consts::SIM_DT, &Default::default());
        }
        assert_eq!(engine.formation().active_pattern(), None);
        assert!(engine.snapshot().formation_offset.x > 0.0);
    }
}
