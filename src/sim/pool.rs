//! Projectile arena
//!
//! Projectiles live in fixed slots for their whole lifetime. Deactivated
//! slots go on a free list and are reused by the next spawn; a handle carries
//! the slot's generation so a handle kept across a recycle goes stale instead
//! of aliasing the new occupant.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::enemy::EnemyId;
use crate::consts::*;

/// What a projectile does on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Player shot, damages enemies
    Friendly,
    /// Enemy shot, damages the player
    Hostile,
    /// Ace beam, starts a capture sequence
    TractorBeam,
}

impl ProjectileKind {
    /// Hitbox side length
    pub fn size(self) -> f32 {
        match self {
            ProjectileKind::TractorBeam => BEAM_SIZE,
            _ => SHOT_SIZE,
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy(EnemyId),
}

/// Slot index + generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileHandle {
    index: u32,
    generation: u32,
}

impl ProjectileHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Unique per spawn, never reused
    pub id: u32,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub owner: Owner,
    pub active: bool,
}

impl Projectile {
    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos, self.kind.size())
    }

    /// Outside the field by more than the culling margin
    pub fn is_off_field(&self) -> bool {
        self.pos.x < -CULL_MARGIN_X
            || self.pos.x > FIELD_WIDTH + CULL_MARGIN_X
            || self.pos.y < -CULL_MARGIN_Y
            || self.pos.y > FIELD_HEIGHT + CULL_MARGIN_Y
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    projectile: Projectile,
}

/// Pool occupancy, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolStats {
    pub active: usize,
    pub pooled: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectilePool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_id: u32,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire a projectile, reusing a free slot if there is one
    pub fn spawn(&mut self, kind: ProjectileKind, pos: Vec2, vel: Vec2, owner: Owner) -> ProjectileHandle {
        let projectile = Projectile {
            id: self.next_id,
            kind,
            pos,
            vel,
            damage: 1,
            owner,
            active: true,
        };
        self.next_id = self.next_id.wrapping_add(1);

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.projectile = projectile;
            return ProjectileHandle {
                index,
                generation: slot.generation,
            };
        }

        // No free slot: grow
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            projectile,
        });
        ProjectileHandle {
            index,
            generation: 0,
        }
    }

    /// Integrate active projectiles and recycle the ones that left the field
    pub fn advance(&mut self, dt: f32) {
        for index in 0..self.slots.len() {
            let projectile = &mut self.slots[index].projectile;
            if !projectile.active {
                continue;
            }
            projectile.pos += projectile.vel * dt;
            if projectile.is_off_field() {
                self.recycle(index as u32);
            }
        }
    }

    /// Deactivate and recycle. Returns false for stale or inactive handles.
    pub fn release(&mut self, handle: ProjectileHandle) -> bool {
        if self.get(handle).is_none() {
            return false;
        }
        self.recycle(handle.index);
        true
    }

    /// Deactivate everything
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() {
            if self.slots[index].projectile.active {
                self.recycle(index as u32);
            }
        }
    }

    fn recycle(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.projectile.active = false;
        slot.projectile.vel = Vec2::ZERO;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }

    /// Look up a live projectile
    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.projectile.active)
            .map(|slot| &slot.projectile)
    }

    /// All active projectiles in slot order
    pub fn iter_active(&self) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.projectile.active.then_some((
                ProjectileHandle {
                    index: index as u32,
                    generation: slot.generation,
                },
                &slot.projectile,
            ))
        })
    }

    pub fn by_kind(&self, kind: ProjectileKind) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> {
        self.iter_active().filter(move |(_, p)| p.kind == kind)
    }

    pub fn by_owner(&self, owner: Owner) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> {
        self.iter_active().filter(move |(_, p)| p.owner == owner)
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Copies of all active projectiles (for snapshots)
    pub fn active_projectiles(&self) -> Vec<Projectile> {
        self.iter_active().map(|(_, p)| p.clone()).collect()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active_count(),
            pooled: self.free.len(),
            total: self.slots.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn shot(pool: &mut ProjectilePool, pos: Vec2) -> ProjectileHandle {
        pool.spawn(ProjectileKind::Friendly, pos, Vec2::new(0.0, -400.0), Owner::Player)
    }

    #[test]
    fn test_spawn_reuses_released_slot() {
        let mut pool = ProjectilePool::new();
        let a = shot(&mut pool, Vec2::new(100.0, 300.0));
        let _b = shot(&mut pool, Vec2::new(120.0, 300.0));
        assert_eq!(pool.stats(), PoolStats { active: 2, pooled: 0, total: 2 });

        assert!(pool.release(a));
        assert_eq!(pool.stats(), PoolStats { active: 1, pooled: 1, total: 2 });

        let c = shot(&mut pool, Vec2::new(140.0, 300.0));
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert_eq!(pool.stats().total, 2);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut pool = ProjectilePool::new();
        let a = shot(&mut pool, Vec2::new(100.0, 300.0));
        assert!(pool.release(a));
        assert!(!pool.release(a));

        let c = shot(&mut pool, Vec2::new(50.0, 50.0));
        assert!(pool.get(a).is_none());
        assert_eq!(pool.get(c).map(|p| p.pos), Some(Vec2::new(50.0, 50.0)));
        // Releasing through the stale handle must not kill the new occupant
        assert!(!pool.release(a));
        assert!(pool.get(c).is_some());
    }

    #[test]
    fn test_advance_culls_off_field() {
        let mut pool = ProjectilePool::new();
        let leaving = pool.spawn(
            ProjectileKind::Friendly,
            Vec2::new(200.0, -CULL_MARGIN_Y + 1.0),
            Vec2::new(0.0, -400.0),
            Owner::Player,
        );
        let staying = shot(&mut pool, Vec2::new(200.0, 300.0));
        pool.advance(0.1);

        assert!(pool.get(leaving).is_none());
        assert!(pool.get(staying).is_some());
        assert_eq!(pool.active_count(), 1);
        assert!((pool.get(staying).unwrap().pos.y - 260.0).abs() < 1e-3);
    }

    #[test]
    fn test_queries_filter_without_mutating() {
        let mut pool = ProjectilePool::new();
        let ace = EnemyId(7);
        shot(&mut pool, Vec2::new(10.0, 10.0));
        pool.spawn(ProjectileKind::Hostile, Vec2::ZERO, Vec2::Y, Owner::Enemy(ace));
        pool.spawn(ProjectileKind::TractorBeam, Vec2::ZERO, Vec2::Y, Owner::Enemy(ace));
        pool.spawn(ProjectileKind::Hostile, Vec2::ZERO, Vec2::Y, Owner::Enemy(EnemyId(8)));

        assert_eq!(pool.by_kind(ProjectileKind::Hostile).count(), 2);
        assert_eq!(pool.by_kind(ProjectileKind::TractorBeam).count(), 1);
        assert_eq!(pool.by_owner(Owner::Enemy(ace)).count(), 2);
        assert_eq!(pool.by_owner(Owner::Player).count(), 1);
        assert_eq!(pool.active_count(), 4);
    }

    #[test]
    fn test_clear_recycles_all() {
        let mut pool = ProjectilePool::new();
        for i in 0..5 {
            shot(&mut pool, Vec2::new(i as f32 * 10.0, 100.0));
        }
        pool.clear();
        assert_eq!(pool.stats(), PoolStats { active: 0, pooled: 5, total: 5 });
        assert!(pool.active_projectiles().is_empty());
    }

    #[test]
    fn test_ids_are_unique_across_reuse() {
        let mut pool = ProjectilePool::new();
        let a = shot(&mut pool, Vec2::ZERO);
        let first_id = pool.get(a).unwrap().id;
        pool.release(a);
        let b = shot(&mut pool, Vec2::ZERO);
        assert_ne!(pool.get(b).unwrap().id, first_id);
    }

    proptest! {
        #[test]
        fn prop_no_active_projectile_outside_margin(
            shots in prop::collection::vec(
                ((-100.0f32..500.0, -100.0f32..700.0), (-800.0f32..800.0, -800.0f32..800.0)),
                1..40,
            ),
            dt in 0.0f32..0.5,
        ) {
            let mut pool = ProjectilePool::new();
            for ((x, y), (vx, vy)) in shots {
                pool.spawn(ProjectileKind::Hostile, Vec2::new(x, y), Vec2::new(vx, vy), Owner::Player);
            }
            pool.advance(dt);
            for (_, p) in pool.iter_active() {
                prop_assert!(!p.is_off_field());
            }
            let stats = pool.stats();
            prop_assert_eq!(stats.active + stats.pooled, stats.total);
        }
    }
}
