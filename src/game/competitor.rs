//! Competitor adapter: one strategy, two pods, timeout and win bookkeeping

use tracing::{trace, warn};

use crate::protocol::{parse_moves, Action, Move};
use crate::strategy::Strategy;

use super::pod::Pod;
use super::EngineFault;

/// Pods controlled by each competitor
pub const PODS_PER_COMPETITOR: usize = 2;
/// Turns without progress before a competitor is eliminated
pub const DEFAULT_TIMEOUT_TURNS: u32 = 100;
/// Boosts available to each competitor per match
pub const BOOST_ALLOWANCE: u32 = 1;

/// Distance ahead of a pod used as the aim point of a coast move
const COAST_AIM_DISTANCE: f64 = 10_000.0;

/// A competitor in a match
pub struct Competitor {
    index: usize,
    strategy: Box<dyn Strategy>,
    /// Indices of this competitor's pods in the match arena
    pod_ids: [usize; PODS_PER_COMPETITOR],
    timeout: u32,
    boosts_available: u32,
    win_time: Option<f64>,
    lost: bool,
}

impl Competitor {
    pub fn new(
        index: usize,
        strategy: Box<dyn Strategy>,
        pod_ids: [usize; PODS_PER_COMPETITOR],
        timeout_turns: u32,
    ) -> Self {
        Self {
            index,
            strategy,
            pod_ids,
            timeout: timeout_turns,
            boosts_available: BOOST_ALLOWANCE,
            win_time: None,
            lost: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pod_ids(&self) -> [usize; PODS_PER_COMPETITOR] {
        self.pod_ids
    }

    /// Turns left before elimination
    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    pub fn boosts_available(&self) -> u32 {
        self.boosts_available
    }

    pub fn has_won(&self) -> bool {
        self.win_time.is_some()
    }

    /// Elapsed turn time of the winning checkpoint crossing
    pub fn win_time(&self) -> Option<f64> {
        self.win_time
    }

    pub fn has_lost(&self) -> bool {
        self.lost
    }

    /// Hand the encoded circuit to the strategy
    pub fn setup(&mut self, circuit: &str) {
        self.strategy.setup(circuit);
    }

    /// Ask the strategy for this turn's moves, one per owned pod
    ///
    /// Malformed lines are salvaged where possible and otherwise replaced by
    /// a coast move (zero thrust, aim straight ahead). Every malformed line
    /// is reported as a fault.
    pub fn request_moves(
        &mut self,
        view: &str,
        pods: &[Pod],
    ) -> ([Move; PODS_PER_COMPETITOR], Vec<EngineFault>) {
        let response = self.strategy.turn(view);
        trace!(competitor = self.index, view, response = %response, "strategy turn");

        let mut faults = Vec::new();
        let parsed = parse_moves(&response, PODS_PER_COMPETITOR);
        let mut moves = self.pod_ids.map(|id| coast_move(&pods[id]));

        for (slot, result) in parsed.into_iter().enumerate() {
            match result {
                Ok(mv) => moves[slot] = mv,
                Err(e) => {
                    warn!(competitor = self.index, pod = slot, error = %e, "malformed move");
                    if let Some(mv) = e.recover() {
                        moves[slot] = mv;
                    }
                    faults.push(EngineFault::MalformedMove {
                        competitor: self.index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        (moves, faults)
    }

    /// Apply this turn's moves to the owned pods
    pub fn apply_controls(
        &mut self,
        moves: &[Move; PODS_PER_COMPETITOR],
        pods: &mut [Pod],
        first_turn: bool,
    ) -> Vec<EngineFault> {
        let mut faults = Vec::new();
        for (id, mv) in self.pod_ids.iter().zip(moves) {
            if let Some(fault) = pods[*id].apply_controls(mv, &mut self.boosts_available, first_turn)
            {
                faults.push(fault);
            }
        }
        faults
    }

    /// End-of-turn arbitration: timeout countdown and win detection
    pub fn end_turn(&mut self, pods: &[Pod], laps: u32, timeout_turns: u32) {
        if self.lost {
            return;
        }

        let mut progress = false;
        for id in self.pod_ids {
            let pod = &pods[id];
            if !pod.made_progress() {
                continue;
            }
            progress = true;
            if pod.has_won(laps) {
                let time = pod.progress_time();
                self.win_time = Some(self.win_time.map_or(time, |t| t.min(time)));
            }
        }

        if progress {
            self.timeout = timeout_turns;
        } else {
            self.timeout = self.timeout.saturating_sub(1);
            if self.timeout == 0 {
                self.lost = true;
            }
        }
    }

    /// Best pod's share of the checkpoints needed to finish, in [0, 1]
    pub fn progress(&self, pods: &[Pod], checkpoint_count: usize, laps: u32) -> f64 {
        let needed = (laps as usize * checkpoint_count + 1) as f64;
        self.pod_ids
            .iter()
            .map(|id| pods[*id].checkpoints_passed(checkpoint_count) as f64 / needed)
            .fold(0.0, f64::max)
            .min(1.0)
    }
}

impl std::fmt::Debug for Competitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Competitor")
            .field("index", &self.index)
            .field("pod_ids", &self.pod_ids)
            .field("timeout", &self.timeout)
            .field("boosts_available", &self.boosts_available)
            .field("win_time", &self.win_time)
            .field("lost", &self.lost)
            .finish()
    }
}

/// Zero thrust aimed straight ahead, so the heading does not change
fn coast_move(pod: &Pod) -> Move {
    Move::new(
        pod.position() + pod.heading() * COAST_AIM_DISTANCE,
        Action::Thrust(0),
    )
}
