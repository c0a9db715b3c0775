//! Never thrusts; keeps its pods pointed at their next checkpoint

use crate::protocol::{CircuitDescription, Move, PodState};

use super::Strategy;

#[derive(Debug, Clone, Default)]
pub struct Idle {
    circuit: Option<CircuitDescription>,
}

impl Idle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for Idle {
    fn setup(&mut self, circuit: &str) {
        self.circuit = CircuitDescription::parse(circuit).ok();
    }

    fn turn(&mut self, view: &str) -> String {
        let pods = PodState::parse_view(view).unwrap_or_default();
        let checkpoints = self
            .circuit
            .as_ref()
            .map(|c| c.checkpoints.as_slice())
            .unwrap_or_default();

        pods.iter()
            .take(2)
            .map(|pod| {
                let (x, y) = if checkpoints.is_empty() {
                    (pod.x + 1, pod.y)
                } else {
                    checkpoints[pod.next_checkpoint % checkpoints.len()]
                };
                format!("{}\n", Move::thrust(x, y, 0))
            })
            .collect()
    }
}
