//! Text codec for the strategy boundary
//!
//! Engine side: circuit and pod views out, moves in.
//! Strategy side: the mirror image, used by the bundled strategies.

use std::str::FromStr;

use crate::game::{Circuit, Pod, Vec2};

use super::{Action, CircuitDescription, Move, MoveError, PodState, ViewError};

/// Serialize the circuit sent once at setup
pub fn encode_circuit(circuit: &Circuit, laps: u32) -> String {
    CircuitDescription {
        laps,
        checkpoints: circuit
            .checkpoints()
            .iter()
            .map(|cp| (cp.x.round() as i64, cp.y.round() as i64))
            .collect(),
    }
    .to_string()
}

/// Integer state of a pod as seen by strategies
pub fn encode_pod(pod: &Pod) -> PodState {
    let position = pod.position().round();
    let velocity = pod.velocity().truncate();
    PodState {
        x: position.x as i64,
        y: position.y as i64,
        vx: velocity.x as i64,
        vy: velocity.y as i64,
        heading: pod.heading().degrees(),
        next_checkpoint: pod.next_checkpoint(),
    }
}

/// One line per pod, in the given order
pub fn encode_view<'a>(states: impl IntoIterator<Item = &'a PodState>) -> String {
    let mut out = String::new();
    for state in states {
        out.push_str(&state.to_string());
        out.push('\n');
    }
    out
}

/// Parse a single `targetX targetY action` line
pub fn parse_move(line: &str) -> Result<Move, MoveError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(MoveError::MissingToken {
            found: tokens.len(),
        });
    }

    let x = parse_coordinate(tokens[0])?;
    let y = parse_coordinate(tokens[1])?;
    let target = Vec2::new(x as f64, y as f64);

    let action = match tokens[2] {
        "BOOST" => Action::Boost,
        "SHIELD" => Action::Shield,
        other => {
            let thrust = other.parse::<i64>().map_err(|_| MoveError::InvalidAction {
                target,
                action: other.to_string(),
            })?;
            if !(0..=100).contains(&thrust) {
                return Err(MoveError::ThrustOutOfRange { target, thrust });
            }
            Action::Thrust(thrust as i32)
        }
    };

    Ok(Move::new(target, action))
}

/// Parse exactly `count` moves; missing lines become `MissingToken` errors
pub fn parse_moves(text: &str, count: usize) -> Vec<Result<Move, MoveError>> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    (0..count)
        .map(|_| match lines.next() {
            Some(line) => parse_move(line),
            None => Err(MoveError::MissingToken { found: 0 }),
        })
        .collect()
}

fn parse_coordinate(token: &str) -> Result<i64, MoveError> {
    token
        .parse::<i64>()
        .map_err(|_| MoveError::InvalidCoordinate(token.to_string()))
}

fn parse_field<T: FromStr>(
    tokens: &mut std::str::SplitWhitespace<'_>,
    field: &'static str,
) -> Result<T, ViewError> {
    let token = tokens.next().ok_or(ViewError::Missing(field))?;
    token.parse::<T>().map_err(|_| ViewError::Invalid {
        field,
        value: token.to_string(),
    })
}

impl PodState {
    /// Parse an `x y vx vy heading nextCheckpoint` line
    pub fn parse(line: &str) -> Result<Self, ViewError> {
        let mut tokens = line.split_whitespace();
        Ok(Self {
            x: parse_field(&mut tokens, "x")?,
            y: parse_field(&mut tokens, "y")?,
            vx: parse_field(&mut tokens, "vx")?,
            vy: parse_field(&mut tokens, "vy")?,
            heading: parse_field(&mut tokens, "heading")?,
            next_checkpoint: parse_field(&mut tokens, "next_checkpoint")?,
        })
    }

    /// Parse every non-empty line of a turn view
    pub fn parse_view(text: &str) -> Result<Vec<Self>, ViewError> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl CircuitDescription {
    /// Parse the setup text: laps, count, then one `x y` pair per checkpoint
    pub fn parse(text: &str) -> Result<Self, ViewError> {
        let mut tokens = text.split_whitespace();
        let laps = parse_field(&mut tokens, "laps")?;
        let count: usize = parse_field(&mut tokens, "checkpoint_count")?;

        let mut checkpoints = Vec::with_capacity(count);
        for _ in 0..count {
            let x = parse_field(&mut tokens, "checkpoint_x")?;
            let y = parse_field(&mut tokens, "checkpoint_y")?;
            checkpoints.push((x, y));
        }

        Ok(Self { laps, checkpoints })
    }
}
