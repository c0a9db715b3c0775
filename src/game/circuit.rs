//! Checkpoint circuit generation and starting grid

use rand::Rng;

use super::pod::Pod;
use super::vec2::Vec2;

pub const MIN_CHECKPOINTS: usize = 2;
pub const MAX_CHECKPOINTS: usize = 8;
pub const MAP_WIDTH: i32 = 16000;
pub const MAP_HEIGHT: i32 = 9000;
/// Checkpoints are placed strictly farther apart than this
pub const MIN_CHECKPOINT_SEPARATION: f64 = 1200.0;
/// Lateral offset of competitor 0's pods from checkpoint 0
pub const GRID_INNER_OFFSET: f64 = 500.0;
/// Extra lateral offset per competitor index
pub const GRID_LANE_SPACING: f64 = 1000.0;

/// Circuit construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CircuitError {
    #[error("circuit needs at least 2 checkpoints, got {0}")]
    TooFewCheckpoints(usize),

    #[error("checkpoints 0 and 1 coincide")]
    DegenerateStart,
}

/// Ordered, wrapping sequence of checkpoints
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    checkpoints: Vec<Vec2>,
}

impl Circuit {
    /// Random circuit by rejection sampling on the map
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let count = rng.gen_range(MIN_CHECKPOINTS..=MAX_CHECKPOINTS);
        let mut checkpoints: Vec<Vec2> = Vec::with_capacity(count);

        while checkpoints.len() < count {
            let candidate = Vec2::new(
                rng.gen_range(0..MAP_WIDTH) as f64,
                rng.gen_range(0..MAP_HEIGHT) as f64,
            );
            let clear = checkpoints
                .iter()
                .all(|cp| (*cp - candidate).length() > MIN_CHECKPOINT_SEPARATION);
            if clear {
                checkpoints.push(candidate);
            }
        }

        Self { checkpoints }
    }

    /// Circuit from explicit checkpoints
    pub fn from_checkpoints(checkpoints: Vec<Vec2>) -> Result<Self, CircuitError> {
        if checkpoints.len() < MIN_CHECKPOINTS {
            return Err(CircuitError::TooFewCheckpoints(checkpoints.len()));
        }
        if checkpoints[0] == checkpoints[1] {
            return Err(CircuitError::DegenerateStart);
        }
        Ok(Self { checkpoints })
    }

    pub fn checkpoints(&self) -> &[Vec2] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Checkpoint by index, wrapping past the end
    pub fn checkpoint(&self, index: usize) -> Vec2 {
        self.checkpoints[index % self.checkpoints.len()]
    }

    /// Starting pods for one competitor
    ///
    /// Pods sit on the line through checkpoint 0 perpendicular to the first
    /// leg, symmetric about it, one lane further out per competitor index.
    pub fn starting_pods(&self, competitor_index: usize) -> [Pod; 2] {
        let start = self.checkpoint(0);
        let target = self.checkpoint(1);
        // from_checkpoints rejects a zero-length first leg
        let lane = (target - start)
            .perpendicular()
            .try_normalize()
            .unwrap_or(Vec2::new(0.0, 1.0));
        let offset = GRID_INNER_OFFSET + GRID_LANE_SPACING * competitor_index as f64;

        [
            Pod::placed(start, lane, offset, target),
            Pod::placed(start, lane, -offset, target),
        ]
    }
}
