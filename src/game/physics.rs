//! Pod physics: continuous collision detection and elastic response

use tracing::debug;

use super::vec2::Vec2;
use super::EngineFault;

/// Radius of a pod's bounding circle
pub const POD_RADIUS: f64 = 400.0;
/// Radius of the zone a pod must enter to reach a checkpoint
pub const CHECKPOINT_RADIUS: f64 = 600.0;
/// Velocity multiplier applied once at the end of every turn
pub const FRICTION: f64 = 0.85;
/// Minimum impulse magnitude delivered by a pod-pod collision
pub const MIN_IMPULSE: f64 = 120.0;
/// Maximum heading change per turn (18 degrees)
pub const MAX_TURN_ANGLE: f64 = std::f64::consts::PI / 10.0;

/// A circular body for time-of-impact queries
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f64,
}

impl Body {
    pub fn moving(position: Vec2, velocity: Vec2, radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }

    /// A static circle (checkpoint)
    pub fn fixed(position: Vec2, radius: f64) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
        }
    }
}

/// Impulses produced by a collision, in the order they must be applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionImpulse {
    /// Impulse from the elastic collision itself
    pub elastic: Vec2,
    /// Second impulse, at least `MIN_IMPULSE` long
    pub bounce: Vec2,
}

/// Physics system for pod motion queries
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Time until the surfaces of two moving circles first touch
    ///
    /// Returns `Some(0.0)` for bodies that already overlap without relative
    /// motion, and `None` when they never touch or only touched in the past.
    pub fn time_of_impact(a: &Body, b: &Body) -> Option<f64> {
        let dp = b.position - a.position;
        let dv = b.velocity - a.velocity;
        let r = a.radius + b.radius;

        let qa = dv.dot(dv);
        let qb = 2.0 * dv.dot(dp);
        let qc = dp.dot(dp) - r * r;

        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            return None;
        }

        if qa == 0.0 {
            return if qc < 0.0 { Some(0.0) } else { None };
        }

        let sqrt_disc = disc.sqrt();
        let t1 = (-qb + sqrt_disc) / (2.0 * qa);
        let t2 = (-qb - sqrt_disc) / (2.0 * qa);
        let t = t1.min(t2);

        if t < 0.0 {
            None
        } else {
            Some(t)
        }
    }

    /// Impulses for an elastic collision between two pods
    ///
    /// Pod 1 receives `+impulse / m1` and pod 2 receives `-impulse / m2`,
    /// first for `elastic` and then for `bounce`.
    pub fn collision_impulse(
        p1: Vec2,
        v1: Vec2,
        m1: f64,
        p2: Vec2,
        v2: Vec2,
        m2: f64,
    ) -> Result<CollisionImpulse, EngineFault> {
        let dp = p2 - p1;
        let dv = v2 - v1;
        let m = (m1 + m2) / (m1 * m2);

        let separation2 = dp.length_squared();
        if separation2 == 0.0 {
            return Err(EngineFault::DegenerateGeometry("coincident pods"));
        }

        let product = dp.dot(dv);
        let elastic = dp * (product / (separation2 * m));

        let impulse = elastic.length();
        let bounce = if impulse >= MIN_IMPULSE {
            elastic
        } else if impulse > 0.0 {
            elastic * (MIN_IMPULSE / impulse)
        } else {
            // Zero relative normal speed: push apart along the separation
            debug!("zero elastic impulse, bouncing along separation");
            dp.try_normalize()
                .map(|n| n * -MIN_IMPULSE)
                .ok_or(EngineFault::DegenerateGeometry("coincident pods"))?
        };

        Ok(CollisionImpulse { elastic, bounce })
    }
}
