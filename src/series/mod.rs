//! Series runner - plays a batch of independently seeded matches

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::game::{run_match, FaultStats, MatchConfig, MatchError, MatchOutcome, MatchResult};
use crate::strategy::StrategyKind;
use crate::util::time::Timer;

/// Series errors
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("match with seed {seed} could not start: {source}")]
    Match {
        seed: u64,
        #[source]
        source: MatchError,
    },

    #[error("match task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Aggregate of a finished series
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub competitors: Vec<StrategyKind>,
    /// Wins per competitor slot
    pub wins: Vec<u32>,
    pub draws: u32,
    pub turn_limits: u32,
    pub faults: FaultStats,
    /// Per-match results, in seed order
    pub matches: Vec<MatchResult>,
}

impl SeriesSummary {
    fn new(competitors: Vec<StrategyKind>) -> Self {
        Self {
            wins: vec![0; competitors.len()],
            competitors,
            draws: 0,
            turn_limits: 0,
            faults: FaultStats::default(),
            matches: Vec::new(),
        }
    }

    fn record(&mut self, result: MatchResult) {
        match result.outcome {
            MatchOutcome::Winner(index) => {
                if let Some(wins) = self.wins.get_mut(index) {
                    *wins += 1;
                }
            }
            MatchOutcome::Draw => self.draws += 1,
            MatchOutcome::TurnLimit => self.turn_limits += 1,
        }
        self.faults.merge(&result.faults);
        self.matches.push(result);
    }
}

/// Run `match_count` matches concurrently, match `i` seeded with `match_seed + i`
///
/// Matches are CPU-bound and run on the blocking pool.
pub async fn run_series(config: &Config) -> Result<SeriesSummary, SeriesError> {
    let timer = Timer::new();
    let match_config = MatchConfig {
        max_turns: config.max_turns,
        ..MatchConfig::default()
    };

    info!(
        matches = config.match_count,
        base_seed = config.match_seed,
        competitors = ?config.competitors,
        "Starting series"
    );

    let tasks = (0..config.match_count).map(|i| {
        let seed = config.match_seed.wrapping_add(i as u64);
        let kinds = config.competitors.clone();
        tokio::task::spawn_blocking(move || {
            let timer = Timer::new();
            let strategies = kinds.iter().map(|kind| kind.build()).collect();
            let result = run_match(seed, strategies, match_config)
                .map_err(|source| SeriesError::Match { seed, source })?;
            debug!(seed, elapsed_ms = timer.elapsed_ms(), "Match task finished");
            Ok::<_, SeriesError>(result)
        })
    });

    let mut summary = SeriesSummary::new(config.competitors.clone());
    for joined in join_all(tasks).await {
        summary.record(joined??);
    }

    info!(
        matches = summary.matches.len(),
        wins = ?summary.wins,
        draws = summary.draws,
        turn_limits = summary.turn_limits,
        elapsed_ms = timer.elapsed_ms(),
        "Series complete"
    );

    Ok(summary)
}
