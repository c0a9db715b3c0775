//! Match state and authoritative turn loop

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::protocol::{encode_circuit, encode_pod, encode_view, Move, PodState};
use crate::strategy::Strategy;

use super::circuit::{Circuit, CircuitError};
use super::competitor::{Competitor, DEFAULT_TIMEOUT_TURNS, PODS_PER_COMPETITOR};
use super::physics::{Body, PhysicsSystem, CHECKPOINT_RADIUS};
use super::pod::Pod;
use super::{EngineFault, FaultStats};

/// Laps needed to finish
pub const LAPS: u32 = 3;
/// Event resolutions allowed within one turn
pub const MAX_EVENT_ITERATIONS: u32 = 1000;
/// Simulated time covered by one turn
const TURN_TIME: f64 = 1.0;

/// Engine tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchConfig {
    pub laps: u32,
    /// Turns without progress before a competitor is eliminated
    pub timeout_turns: u32,
    pub max_event_iterations: u32,
    /// Hard cap on turns played by `run`
    pub max_turns: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            laps: LAPS,
            timeout_turns: DEFAULT_TIMEOUT_TURNS,
            max_event_iterations: MAX_EVENT_ITERATIONS,
            max_turns: 2000,
        }
    }
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "competitor", rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner(usize),
    /// Every remaining competitor was eliminated in the same turn, or two
    /// competitors finished at exactly the same time
    Draw,
    /// `max_turns` reached without a decision
    TurnLimit,
}

/// Result of a single turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    Decided(MatchOutcome),
}

/// Summary of a finished match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub seed: Option<u64>,
    pub outcome: MatchOutcome,
    pub turns: u32,
    pub checkpoints: usize,
    /// Progress fraction per competitor at the end of the match
    pub progress: Vec<f64>,
    pub faults: FaultStats,
}

impl MatchResult {
    pub fn winner(&self) -> Option<usize> {
        match self.outcome {
            MatchOutcome::Winner(index) => Some(index),
            MatchOutcome::Draw | MatchOutcome::TurnLimit => None,
        }
    }
}

/// Match construction errors
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("a match needs at least 2 competitors, got {0}")]
    NotEnoughCompetitors(usize),

    #[error("invalid circuit: {0}")]
    Circuit(#[from] CircuitError),
}

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchPhase {
    InProgress,
    Ended(MatchOutcome),
}

/// Something that happens partway through a turn
#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    Checkpoint { pod: usize, time: f64 },
    Collision { first: usize, second: usize, time: f64 },
}

impl Event {
    fn time(&self) -> f64 {
        match self {
            Event::Checkpoint { time, .. } | Event::Collision { time, .. } => *time,
        }
    }
}

/// The authoritative match
pub struct GameMatch {
    seed: Option<u64>,
    config: MatchConfig,
    circuit: Circuit,
    competitors: Vec<Competitor>,
    /// Every pod in the match, competitor `k` owning `2k` and `2k + 1`
    pods: Vec<Pod>,
    turn: u32,
    phase: MatchPhase,
    faults: FaultStats,
}

impl GameMatch {
    /// Create a match on a circuit generated from `seed`
    pub fn new(
        seed: u64,
        strategies: Vec<Box<dyn Strategy>>,
        config: MatchConfig,
    ) -> Result<Self, MatchError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut game_match = Self::generate(&mut rng, strategies, config)?;
        game_match.seed = Some(seed);
        Ok(game_match)
    }

    /// Create a match on a circuit drawn from `rng`
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        strategies: Vec<Box<dyn Strategy>>,
        config: MatchConfig,
    ) -> Result<Self, MatchError> {
        if strategies.len() < 2 {
            return Err(MatchError::NotEnoughCompetitors(strategies.len()));
        }
        Self::with_circuit(Circuit::generate(rng), strategies, config)
    }

    /// Create a match on a given circuit
    pub fn with_circuit(
        circuit: Circuit,
        strategies: Vec<Box<dyn Strategy>>,
        config: MatchConfig,
    ) -> Result<Self, MatchError> {
        if strategies.len() < 2 {
            return Err(MatchError::NotEnoughCompetitors(strategies.len()));
        }

        let mut pods = Vec::with_capacity(strategies.len() * PODS_PER_COMPETITOR);
        let mut competitors = Vec::with_capacity(strategies.len());
        for (index, strategy) in strategies.into_iter().enumerate() {
            let first = pods.len();
            pods.extend(circuit.starting_pods(index));
            competitors.push(Competitor::new(
                index,
                strategy,
                [first, first + 1],
                config.timeout_turns,
            ));
        }

        let description = encode_circuit(&circuit, config.laps);
        for competitor in &mut competitors {
            competitor.setup(&description);
        }

        Ok(Self {
            seed: None,
            config,
            circuit,
            competitors,
            pods,
            turn: 0,
            phase: MatchPhase::InProgress,
            faults: FaultStats::default(),
        })
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn pods(&self) -> &[Pod] {
        &self.pods
    }

    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    /// Turns played so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn faults(&self) -> FaultStats {
        self.faults
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        match self.phase {
            MatchPhase::InProgress => None,
            MatchPhase::Ended(outcome) => Some(outcome),
        }
    }

    /// Normalized race progress of a competitor's best pod, in [0, 1]
    pub fn progress(&self, competitor: usize) -> Option<f64> {
        self.competitors
            .get(competitor)
            .map(|c| c.progress(&self.pods, self.circuit.len(), self.config.laps))
    }

    /// Play turns until the match is decided or the turn cap is reached
    pub fn run(mut self) -> MatchResult {
        info!(
            seed = ?self.seed,
            checkpoints = self.circuit.len(),
            competitors = self.competitors.len(),
            "Match started"
        );

        let outcome = loop {
            if let Some(outcome) = self.outcome() {
                break outcome;
            }
            if self.turn >= self.config.max_turns {
                warn!(seed = ?self.seed, turns = self.turn, "Turn limit reached");
                self.phase = MatchPhase::Ended(MatchOutcome::TurnLimit);
                break MatchOutcome::TurnLimit;
            }
            if let TurnOutcome::Decided(outcome) = self.run_turn() {
                break outcome;
            }
        };

        info!(seed = ?self.seed, ?outcome, turns = self.turn, "Match ended");

        MatchResult {
            seed: self.seed,
            outcome,
            turns: self.turn,
            checkpoints: self.circuit.len(),
            progress: (0..self.competitors.len())
                .filter_map(|i| self.progress(i))
                .collect(),
            faults: self.faults,
        }
    }

    /// Play a single turn
    pub fn run_turn(&mut self) -> TurnOutcome {
        if let MatchPhase::Ended(outcome) = self.phase {
            return TurnOutcome::Decided(outcome);
        }

        let moves = self.collect_moves();
        self.apply_controls(&moves);
        self.resolve_events();
        for pod in &mut self.pods {
            pod.end_turn();
        }
        self.turn += 1;

        let outcome = self.arbitrate();
        if let TurnOutcome::Decided(decided) = outcome {
            self.phase = MatchPhase::Ended(decided);
        }
        outcome
    }

    /// Send each competitor its view and parse the replies
    fn collect_moves(&mut self) -> Vec<[Move; PODS_PER_COMPETITOR]> {
        let states: Vec<PodState> = self.pods.iter().map(encode_pod).collect();
        let count = self.competitors.len();

        let mut all_moves = Vec::with_capacity(count);
        for k in 0..count {
            let order = std::iter::once(k).chain((0..count).filter(|&j| j != k));
            let view = encode_view(
                order
                    .flat_map(|j| self.competitors[j].pod_ids())
                    .map(|id| &states[id]),
            );

            let (moves, faults) = self.competitors[k].request_moves(&view, &self.pods);
            for fault in &faults {
                self.faults.record(fault);
            }
            all_moves.push(moves);
        }
        all_moves
    }

    fn apply_controls(&mut self, moves: &[[Move; PODS_PER_COMPETITOR]]) {
        let first_turn = self.turn == 0;
        for (competitor, moves) in self.competitors.iter_mut().zip(moves) {
            for fault in competitor.apply_controls(moves, &mut self.pods, first_turn) {
                debug!(turn = self.turn, competitor = competitor.index(), %fault, "control fault");
                self.faults.record(&fault);
            }
        }
    }

    /// Resolve checkpoint crossings and collisions in time order
    fn resolve_events(&mut self) {
        let mut remaining = TURN_TIME;
        let mut iterations = 0;

        loop {
            if iterations >= self.config.max_event_iterations {
                let fault = EngineFault::UnresolvableEventLoop { remaining };
                warn!(turn = self.turn, %fault, "forcing end of turn");
                self.faults.record(&fault);
                break;
            }
            iterations += 1;

            let Some(event) = self.next_event(remaining) else {
                break;
            };

            let dt = event.time();
            self.advance_pods(dt);
            remaining -= dt;
            self.apply_event(event, TURN_TIME - remaining);
        }

        self.advance_pods(remaining);
    }

    /// Earliest event within the remaining turn time
    ///
    /// On an exact tie the checkpoint crossing goes first; the collision is
    /// found again at time zero on the next pass.
    fn next_event(&self, remaining: f64) -> Option<Event> {
        let checkpoint = self.next_checkpoint_event(remaining);
        let collision = self.next_collision_event(remaining);

        match (checkpoint, collision) {
            (Some(cp), Some(col)) => {
                if cp.time() <= col.time() {
                    Some(cp)
                } else {
                    Some(col)
                }
            }
            (cp, col) => cp.or(col),
        }
    }

    fn next_checkpoint_event(&self, remaining: f64) -> Option<Event> {
        let mut earliest: Option<Event> = None;
        for (id, pod) in self.pods.iter().enumerate() {
            let mover = Body::moving(pod.position(), pod.velocity(), 0.0);
            let target = Body::fixed(
                self.circuit.checkpoint(pod.next_checkpoint()),
                CHECKPOINT_RADIUS,
            );
            let Some(time) = PhysicsSystem::time_of_impact(&mover, &target) else {
                continue;
            };
            if time <= remaining && earliest.map_or(true, |e| time < e.time()) {
                earliest = Some(Event::Checkpoint { pod: id, time });
            }
        }
        earliest
    }

    fn next_collision_event(&self, remaining: f64) -> Option<Event> {
        let mut earliest: Option<Event> = None;
        for first in 0..self.pods.len() {
            for second in (first + 1)..self.pods.len() {
                let a = self.pods[first].body();
                let b = self.pods[second].body();
                let Some(time) = PhysicsSystem::time_of_impact(&a, &b) else {
                    continue;
                };
                if time <= remaining && earliest.map_or(true, |e| time < e.time()) {
                    earliest = Some(Event::Collision {
                        first,
                        second,
                        time,
                    });
                }
            }
        }
        earliest
    }

    fn apply_event(&mut self, event: Event, elapsed: f64) {
        match event {
            Event::Checkpoint { pod, .. } => {
                let checkpoint_count = self.circuit.len();
                let pod_ref = &mut self.pods[pod];
                pod_ref.make_progress(elapsed, checkpoint_count);
                debug!(
                    turn = self.turn,
                    pod,
                    elapsed,
                    lap = pod_ref.lap(),
                    next_checkpoint = pod_ref.next_checkpoint(),
                    "checkpoint reached"
                );
            }
            Event::Collision { first, second, .. } => {
                let (head, tail) = self.pods.split_at_mut(second);
                if let Err(fault) = Pod::collide(&mut head[first], &mut tail[0]) {
                    debug!(turn = self.turn, first, second, %fault, "collision skipped");
                    self.faults.record(&fault);
                } else {
                    debug!(turn = self.turn, first, second, elapsed, "pods collided");
                }
            }
        }
    }

    fn advance_pods(&mut self, dt: f64) {
        for pod in &mut self.pods {
            pod.advance(dt);
        }
    }

    /// Timeouts, wins, and the turn's verdict
    fn arbitrate(&mut self) -> TurnOutcome {
        for competitor in &mut self.competitors {
            let was_lost = competitor.has_lost();
            competitor.end_turn(&self.pods, self.config.laps, self.config.timeout_turns);
            if competitor.has_lost() && !was_lost {
                info!(
                    seed = ?self.seed,
                    turn = self.turn,
                    competitor = competitor.index(),
                    "Competitor timed out"
                );
            }
        }

        let mut best: Option<(usize, f64)> = None;
        let mut tied = false;
        for competitor in &self.competitors {
            let Some(time) = competitor.win_time() else {
                continue;
            };
            match best {
                Some((_, best_time)) if time > best_time => {}
                Some((_, best_time)) if time == best_time => tied = true,
                _ => {
                    best = Some((competitor.index(), time));
                    tied = false;
                }
            }
        }
        if let Some((index, _)) = best {
            return TurnOutcome::Decided(if tied {
                MatchOutcome::Draw
            } else {
                MatchOutcome::Winner(index)
            });
        }

        let mut remaining = self.competitors.iter().filter(|c| !c.has_lost());
        match (remaining.next(), remaining.next()) {
            (None, _) => TurnOutcome::Decided(MatchOutcome::Draw),
            (Some(last), None) => TurnOutcome::Decided(MatchOutcome::Winner(last.index())),
            _ => TurnOutcome::Continue,
        }
    }
}

/// Play a seeded match to completion
pub fn run_match(
    seed: u64,
    strategies: Vec<Box<dyn Strategy>>,
    config: MatchConfig,
) -> Result<MatchResult, MatchError> {
    Ok(GameMatch::new(seed, strategies, config)?.run())
}
