//! Tractor-beam capture sequence
//!
//! Started when a beam touches a vulnerable player. Runs BeamDeploying then
//! Pulling, each for a fixed duration; finishing Pulling resolves the capture
//! and the engine drops the sequence in the same tick.

use serde::{Deserialize, Serialize};

use super::enemy::EnemyId;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapturePhase {
    BeamDeploying,
    Pulling,
    Captured,
}

/// What one `advance` did to the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStep {
    InProgress,
    /// Pulling finished this tick; apply the capture now
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSequence {
    pub phase: CapturePhase,
    /// Fraction of the current phase elapsed, 0..=1
    pub progress: f32,
    /// Ace that fired the beam
    pub ace: EnemyId,
    pub player_captured: bool,
    deploy_duration: f32,
    pull_duration: f32,
}

impl CaptureSequence {
    pub fn new(ace: EnemyId, tuning: &Tuning) -> Self {
        Self {
            phase: CapturePhase::BeamDeploying,
            progress: 0.0,
            ace,
            player_captured: false,
            deploy_duration: tuning.beam_deploy_duration,
            pull_duration: tuning.pull_duration,
        }
    }

    pub fn advance(&mut self, dt: f32) -> CaptureStep {
        match self.phase {
            CapturePhase::BeamDeploying => {
                if Self::accumulate(&mut self.progress, dt, self.deploy_duration) {
                    self.phase = CapturePhase::Pulling;
                    self.progress = 0.0;
                }
                CaptureStep::InProgress
            }
            CapturePhase::Pulling => {
                if Self::accumulate(&mut self.progress, dt, self.pull_duration) {
                    self.phase = CapturePhase::Captured;
                    self.player_captured = true;
                    CaptureStep::Resolved
                } else {
                    CaptureStep::InProgress
                }
            }
            CapturePhase::Captured => CaptureStep::Resolved,
        }
    }

    /// Returns true once the phase is complete
    fn accumulate(progress: &mut f32, dt: f32, duration: f32) -> bool {
        if duration <= 0.0 {
            *progress = 1.0;
            return true;
        }
        *progress = (*progress + dt / duration).min(1.0);
        // Tolerate float drift from many small steps
        *progress >= 1.0 - 1e-4
    }
}
