//! Pod Race Engine - deterministic turn-based pod racing simulation
//!
//! Two or more competitors each steer two pods around a circuit of
//! checkpoints. The engine owns all physics: analytic time-of-impact
//! detection, elastic collisions, friction, and win/timeout arbitration.
//! Strategies only exchange text with it.

pub mod config;
pub mod game;
pub mod protocol;
pub mod series;
pub mod strategy;
pub mod util;
