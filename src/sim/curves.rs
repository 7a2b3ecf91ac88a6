//! Parametric motion curves
//!
//! Dive curves are sampled into waypoint paths once, when the dive starts.
//! Formation patterns are evaluated every tick while they override the sweep.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::rng::SimRng;
use crate::consts::DIVE_PATH_STEPS;

/// Named dive shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionCurve {
    Straight,
    Loop,
    Spiral,
    Zigzag,
    CurveLeft,
    CurveRight,
    FigureEight,
}

impl MotionCurve {
    pub const ALL: [MotionCurve; 7] = [
        MotionCurve::Straight,
        MotionCurve::Loop,
        MotionCurve::Spiral,
        MotionCurve::Zigzag,
        MotionCurve::CurveLeft,
        MotionCurve::CurveRight,
        MotionCurve::FigureEight,
    ];

    /// Seconds of curve time the path covers
    pub fn duration(self) -> f32 {
        match self {
            MotionCurve::Straight => 2.0,
            MotionCurve::Loop => 3.0,
            MotionCurve::Spiral => 4.0,
            MotionCurve::Zigzag => 2.5,
            MotionCurve::FigureEight => 5.0,
            MotionCurve::CurveLeft | MotionCurve::CurveRight => 3.0,
        }
    }

    /// Offset from the dive start at curve time `t` (seconds)
    pub fn offset_at(self, t: f32) -> Vec2 {
        match self {
            MotionCurve::Straight => Vec2::new(0.0, t * 200.0),
            MotionCurve::Loop => {
                let angle = t * PI * 2.0;
                Vec2::new(angle.sin() * 60.0, t * 150.0 + angle.cos() * 30.0)
            }
            MotionCurve::Spiral => {
                let angle = t * PI * 3.0;
                let radius = 50.0 + t * 40.0;
                Vec2::new(angle.cos() * radius, angle.sin() * radius + t * 120.0)
            }
            MotionCurve::Zigzag => Vec2::new((t * PI * 3.0).sin() * 80.0, t * 180.0),
            MotionCurve::CurveLeft => Vec2::new(-t * t * 100.0, t * 200.0),
            MotionCurve::CurveRight => Vec2::new(t * t * 100.0, t * 200.0),
            MotionCurve::FigureEight => {
                let angle = t * PI * 2.0;
                Vec2::new(angle.sin() * 40.0, (angle * 2.0).sin() * 40.0 + t * 100.0)
            }
        }
    }

    /// Sample `DIVE_PATH_STEPS + 1` waypoints starting at `start`
    pub fn sample_path(self, start: Vec2) -> Vec<Vec2> {
        let duration = self.duration();
        (0..=DIVE_PATH_STEPS)
            .map(|i| {
                let t = i as f32 / DIVE_PATH_STEPS as f32 * duration;
                start + self.offset_at(t)
            })
            .collect()
    }

    /// Signature curve for a kind: aces spiral/loop, escorts loop/curve,
    /// grunts mostly curve with the occasional straight drop
    pub fn pick_for(kind: EnemyKind, rng: &mut SimRng) -> Self {
        match kind {
            EnemyKind::Ace => {
                if rng.chance(0.5) {
                    MotionCurve::Spiral
                } else {
                    MotionCurve::Loop
                }
            }
            EnemyKind::Escort => {
                if rng.chance(0.5) {
                    MotionCurve::Loop
                } else {
                    MotionCurve::CurveLeft
                }
            }
            EnemyKind::Grunt => {
                if rng.chance(0.3) {
                    MotionCurve::Straight
                } else {
                    MotionCurve::CurveRight
                }
            }
        }
    }

    /// Swap in a nastier curve as difficulty (0..=2) climbs
    pub fn scale_for_difficulty(self, difficulty: f32, rng: &mut SimRng) -> Self {
        if difficulty > 1.5 {
            match self {
                MotionCurve::Straight => MotionCurve::Zigzag,
                MotionCurve::Loop => MotionCurve::FigureEight,
                other => other,
            }
        } else if difficulty > 1.0 {
            match self {
                MotionCurve::Straight if rng.chance(0.5) => MotionCurve::CurveLeft,
                MotionCurve::Straight => MotionCurve::CurveRight,
                other => other,
            }
        } else {
            self
        }
    }
}

/// Scripted whole-formation motions that temporarily replace the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationPattern {
    Wave,
    Circle,
    AttackSwoop,
    Retreat,
    Defensive,
}

impl FormationPattern {
    pub const ALL: [FormationPattern; 5] = [
        FormationPattern::Wave,
        FormationPattern::Circle,
        FormationPattern::AttackSwoop,
        FormationPattern::Retreat,
        FormationPattern::Defensive,
    ];

    pub fn duration(self) -> f32 {
        match self {
            FormationPattern::Wave => 4.0,
            FormationPattern::Circle => 6.0,
            FormationPattern::AttackSwoop => 3.0,
            FormationPattern::Retreat => 2.0,
            FormationPattern::Defensive => 5.0,
        }
    }

    /// Offset relative to where the formation was when the pattern began
    pub fn offset_at(self, t: f32) -> Vec2 {
        match self {
            FormationPattern::Wave => Vec2::new((t * PI).sin() * 30.0, (t * PI * 0.5).sin() * 10.0),
            FormationPattern::Circle => {
                let angle = t / 6.0 * PI * 2.0;
                // Starts at the origin so the pattern doesn't jump
                Vec2::new((angle.cos() - 1.0) * 40.0, angle.sin() * 20.0)
            }
            FormationPattern::AttackSwoop => Vec2::new((t * PI).sin() * 60.0, t * 30.0),
            FormationPattern::Retreat => Vec2::new(0.0, -t * 40.0),
            FormationPattern::Defensive => Vec2::new(
                (t * PI * 2.0).sin() * 20.0,
                -(t * PI).sin().abs() * 15.0,
            ),
        }
    }
}
