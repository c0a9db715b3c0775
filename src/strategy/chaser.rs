//! Heads straight for each pod's next checkpoint

use tracing::warn;

use crate::game::Vec2;
use crate::protocol::{Action, CircuitDescription, Move, PodState};

use super::Strategy;

#[derive(Debug, Clone)]
pub struct CheckpointChaser {
    thrust: i32,
    boosts_left: u32,
    circuit: Option<CircuitDescription>,
}

impl CheckpointChaser {
    pub fn new() -> Self {
        Self {
            thrust: 100,
            boosts_left: 1,
            circuit: None,
        }
    }

    /// Never ask for a boost
    pub fn without_boost(mut self) -> Self {
        self.boosts_left = 0;
        self
    }

    pub fn with_thrust(mut self, thrust: i32) -> Self {
        self.thrust = thrust.clamp(0, 100);
        self
    }

    fn aim(&self, pod: &PodState) -> (i64, i64) {
        match &self.circuit {
            Some(circuit) if !circuit.checkpoints.is_empty() => {
                circuit.checkpoints[pod.next_checkpoint % circuit.checkpoints.len()]
            }
            // No map: keep flying straight
            _ => {
                let heading = (pod.heading as f64).to_radians();
                (
                    pod.x + (heading.cos() * 10_000.0) as i64,
                    pod.y + (heading.sin() * 10_000.0) as i64,
                )
            }
        }
    }
}

impl Default for CheckpointChaser {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for CheckpointChaser {
    fn setup(&mut self, circuit: &str) {
        match CircuitDescription::parse(circuit) {
            Ok(desc) => self.circuit = Some(desc),
            Err(e) => warn!(error = %e, "chaser could not read circuit"),
        }
    }

    fn turn(&mut self, view: &str) -> String {
        let pods = match PodState::parse_view(view) {
            Ok(pods) => pods,
            Err(e) => {
                warn!(error = %e, "chaser could not read turn view");
                return String::new();
            }
        };

        let mut out = String::new();
        for pod in pods.iter().take(2) {
            let (x, y) = self.aim(pod);
            let action = if self.boosts_left > 0 {
                self.boosts_left -= 1;
                Action::Boost
            } else {
                Action::Thrust(self.thrust)
            };
            out.push_str(&Move::new(Vec2::new(x as f64, y as f64), action).to_string());
            out.push('\n');
        }
        out
    }
}
