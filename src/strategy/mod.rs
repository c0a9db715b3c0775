//! Competitor strategies
//!
//! The engine only sees the `Strategy` trait. The bundled strategies are
//! simple reference opponents for tests and the series runner.

mod chaser;
mod idle;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use chaser::CheckpointChaser;
pub use idle::Idle;

/// A competitor's decision maker
pub trait Strategy: Send {
    /// Called once per match with the encoded circuit description
    fn setup(&mut self, circuit: &str);

    /// Called once per turn with the encoded view (own pods first); returns
    /// one `targetX targetY action` line per owned pod
    fn turn(&mut self, view: &str) -> String;
}

/// Built-in strategies selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Full thrust at the next checkpoint, boosting once
    Chaser,
    /// Never thrusts
    Idle,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Chaser => Box::new(CheckpointChaser::new()),
            StrategyKind::Idle => Box::new(Idle::new()),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chaser" => Ok(StrategyKind::Chaser),
            "idle" => Ok(StrategyKind::Idle),
            other => Err(format!("unknown strategy {:?}", other)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Chaser => f.write_str("chaser"),
            StrategyKind::Idle => f.write_str("idle"),
        }
    }
}
