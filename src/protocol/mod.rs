//! Turn protocol message definitions
//! These are the text types exchanged with competitor strategies

pub mod codec;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::Vec2;

pub use codec::{encode_circuit, encode_pod, encode_view, parse_move, parse_moves};

/// Action half of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Action {
    /// Thrust in 0..=100
    Thrust(i32),
    /// One-shot high acceleration
    Boost,
    /// Heavy mass, no acceleration, starts a cooldown
    Shield,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Thrust(thrust) => write!(f, "{}", thrust),
            Action::Boost => f.write_str("BOOST"),
            Action::Shield => f.write_str("SHIELD"),
        }
    }
}

/// One decision for one pod
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Aim point
    pub target: Vec2,
    pub action: Action,
}

impl Move {
    pub fn new(target: Vec2, action: Action) -> Self {
        Self { target, action }
    }

    pub fn thrust(x: i64, y: i64, thrust: i32) -> Self {
        Self::new(Vec2::new(x as f64, y as f64), Action::Thrust(thrust))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.target.x.round() as i64,
            self.target.y.round() as i64,
            self.action
        )
    }
}

/// Integer view of one pod, as sent to strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodState {
    pub x: i64,
    pub y: i64,
    pub vx: i64,
    pub vy: i64,
    /// Heading in degrees, 0..360
    pub heading: i32,
    pub next_checkpoint: usize,
}

impl fmt::Display for PodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.x, self.y, self.vx, self.vy, self.heading, self.next_checkpoint
        )
    }
}

/// Circuit as sent to strategies at setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDescription {
    pub laps: u32,
    pub checkpoints: Vec<(i64, i64)>,
}

impl fmt::Display for CircuitDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.laps)?;
        writeln!(f, "{}", self.checkpoints.len())?;
        for (x, y) in &self.checkpoints {
            writeln!(f, "{} {}", x, y)?;
        }
        Ok(())
    }
}

/// Move parsing errors (malformed strategy output)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoveError {
    #[error("expected `x y action`, found {found} token(s)")]
    MissingToken { found: usize },

    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(String),

    #[error("invalid action {action:?}")]
    InvalidAction { target: Vec2, action: String },

    #[error("thrust {thrust} outside 0..=100")]
    ThrustOutOfRange { target: Vec2, thrust: i64 },
}

impl MoveError {
    /// Best-effort move salvaged from a malformed line
    ///
    /// An unreadable action still steers toward a readable target with zero
    /// thrust, an out-of-range thrust is clamped. Without a target there is
    /// nothing to salvage.
    pub fn recover(&self) -> Option<Move> {
        match self {
            MoveError::InvalidAction { target, .. } => Some(Move::new(*target, Action::Thrust(0))),
            MoveError::ThrustOutOfRange { target, thrust } => Some(Move::new(
                *target,
                Action::Thrust((*thrust).clamp(0, 100) as i32),
            )),
            MoveError::MissingToken { .. } | MoveError::InvalidCoordinate(_) => None,
        }
    }
}

/// Errors reading circuit descriptions or pod states
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("missing field: {0}")]
    Missing(&'static str),

    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}
