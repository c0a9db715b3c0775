//! Turn simulation engine

pub mod circuit;
pub mod competitor;
pub mod r#match;
pub mod physics;
pub mod pod;
pub mod vec2;

pub use circuit::Circuit;
pub use competitor::Competitor;
pub use r#match::{
    run_match, GameMatch, MatchConfig, MatchError, MatchOutcome, MatchResult, TurnOutcome,
};
pub use pod::Pod;
pub use vec2::Vec2;

/// Engine-local faults. Each one has a recovery policy and is never
/// reported to a competitor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineFault {
    /// A strategy response could not be parsed into moves
    #[error("malformed move from competitor {competitor}: {reason}")]
    MalformedMove { competitor: usize, reason: String },

    /// Normalization of a zero-length vector was requested
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    /// The in-turn event loop hit its iteration cap with time left
    #[error("event loop exhausted with {remaining} turn time remaining")]
    UnresolvableEventLoop { remaining: f64 },
}

/// Fault counters collected over a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FaultStats {
    pub malformed_moves: u32,
    pub degenerate_geometry: u32,
    pub exhausted_event_loops: u32,
}

impl FaultStats {
    pub fn record(&mut self, fault: &EngineFault) {
        match fault {
            EngineFault::MalformedMove { .. } => self.malformed_moves += 1,
            EngineFault::DegenerateGeometry(_) => self.degenerate_geometry += 1,
            EngineFault::UnresolvableEventLoop { .. } => self.exhausted_event_loops += 1,
        }
    }

    /// Add another set of counters to this one
    pub fn merge(&mut self, other: &FaultStats) {
        self.malformed_moves += other.malformed_moves;
        self.degenerate_geometry += other.degenerate_geometry;
        self.exhausted_event_loops += other.exhausted_event_loops;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_stats_record_and_merge() {
        let mut stats = FaultStats::default();
        stats.record(&EngineFault::DegenerateGeometry("coincident pods"));
        stats.record(&EngineFault::MalformedMove {
            competitor: 0,
            reason: "empty".to_string(),
        });

        let mut total = FaultStats {
            exhausted_event_loops: 1,
            ..FaultStats::default()
        };
        total.merge(&stats);
        total.merge(&stats);

        assert_eq!(
            total,
            FaultStats {
                malformed_moves: 2,
                degenerate_geometry: 2,
                exhausted_event_loops: 1,
            }
        );
    }
}
