//! Demo/attract-mode pilot
//!
//! Produces a `TickInput` from nothing but the published snapshot, so a
//! replayed session with the same seed makes the same decisions.

use super::pool::ProjectileKind;
use super::state::{GamePhase, GameState};
use super::tick::TickInput;

/// How far above the ship a hostile shot counts as incoming
const DANGER_HEIGHT: f32 = 120.0;
/// Horizontal half-width of the lane the pilot keeps clear
const DANGER_HALF_WIDTH: f32 = 18.0;
/// Don't twitch for small tracking errors
const DEADZONE: f32 = 4.0;

/// Pick this tick's intents for the current snapshot
pub fn autopilot(state: &GameState) -> TickInput {
    if state.phase != GamePhase::Playing {
        return TickInput::default();
    }

    let player = &state.player;
    let x = player.pos.x;

    // Dodge first: nearest hostile shot dropping into our lane
    let threat = state
        .projectiles
        .iter()
        .filter(|p| p.kind != ProjectileKind::Friendly)
        .filter(|p| {
            let above = player.pos.y - p.pos.y;
            above > 0.0 && above < DANGER_HEIGHT && (p.pos.x - x).abs() < DANGER_HALF_WIDTH
        })
        .min_by(|a, b| b.pos.y.total_cmp(&a.pos.y));

    if let Some(shot) = threat {
        // Step away from the shot's side of the ship
        let go_left = shot.pos.x >= x;
        return TickInput {
            left: go_left,
            right: !go_left,
            shoot: true,
            ..Default::default()
        };
    }

    // Otherwise line up under the lowest living enemy
    let target = state
        .enemies
        .iter()
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y).then(b.id.cmp(&a.id)))
        .map(|e| e.pos.x);

    let (left, right) = match target {
        Some(tx) if tx < x - DEADZONE => (true, false),
        Some(tx) if tx > x + DEADZONE => (false, true),
        _ => (false, false),
    };

    TickInput {
        left,
        right,
        shoot: true,
        ..Default::default()
    }
}
