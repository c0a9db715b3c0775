//! Pod state and per-turn behaviour

use crate::protocol::{Action, Move};

use super::physics::{Body, PhysicsSystem, FRICTION, MAX_TURN_ANGLE, POD_RADIUS};
use super::vec2::Vec2;
use super::EngineFault;

/// Acceleration granted by a boost
pub const BOOST_ACCELERATION: f64 = 650.0;
/// Acceleration for a boost request once the allowance is spent
pub const SPENT_BOOST_ACCELERATION: f64 = 100.0;
/// Turns of zero acceleration after a shield, including the shield turn
pub const SHIELD_COOLDOWN: u32 = 4;
pub const NORMAL_MASS: f64 = 1.0;
pub const SHIELD_MASS: f64 = 10.0;

/// A single racing pod
#[derive(Debug, Clone, PartialEq)]
pub struct Pod {
    position: Vec2,
    velocity: Vec2,
    /// Unit vector the pod is facing
    heading: Vec2,
    lap: u32,
    next_checkpoint: usize,
    shield_cooldown: u32,
    mass: f64,
    made_progress: bool,
    progress_time: f64,
}

impl Pod {
    /// Pod at rest at `position`, facing `heading`
    pub fn new(position: Vec2, heading: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            heading,
            lap: 0,
            next_checkpoint: 1,
            shield_cooldown: 0,
            mass: NORMAL_MASS,
            made_progress: false,
            progress_time: 0.0,
        }
    }

    /// Place a pod at `origin + direction * offset` (rounded), aimed at `target`
    pub fn placed(origin: Vec2, direction: Vec2, offset: f64, target: Vec2) -> Self {
        let position = (origin + direction * offset).round();
        let heading = (target - position)
            .try_normalize()
            .unwrap_or_else(|| Vec2::new(1.0, 0.0));
        Self::new(position, heading)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    pub fn lap(&self) -> u32 {
        self.lap
    }

    pub fn next_checkpoint(&self) -> usize {
        self.next_checkpoint
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn shield_cooldown(&self) -> u32 {
        self.shield_cooldown
    }

    pub fn made_progress(&self) -> bool {
        self.made_progress
    }

    /// Elapsed turn time at which the last checkpoint of this turn was reached
    pub fn progress_time(&self) -> f64 {
        self.progress_time
    }

    /// Finished the race: all laps done and checkpoint 0 crossed again
    pub fn has_won(&self, laps: u32) -> bool {
        self.lap >= laps && self.next_checkpoint == 1
    }

    /// Checkpoints reached so far, counting the implicit start at checkpoint 0
    pub fn checkpoints_passed(&self, checkpoint_count: usize) -> usize {
        self.lap as usize * checkpoint_count + self.next_checkpoint
    }

    pub fn body(&self) -> Body {
        Body::moving(self.position, self.velocity, POD_RADIUS)
    }

    /// Apply a move at the start of a turn
    ///
    /// Sets mass and shield cooldown, steers toward the target (at most
    /// `MAX_TURN_ANGLE` unless `first_turn`), adds thrust to the velocity and
    /// clears the progress flags. A target on top of the pod leaves the
    /// heading unchanged and is reported as a fault.
    pub fn apply_controls(
        &mut self,
        mv: &Move,
        boosts_available: &mut u32,
        first_turn: bool,
    ) -> Option<EngineFault> {
        let acceleration = self.acceleration(mv.action, boosts_available);
        if self.shield_cooldown > 0 {
            self.shield_cooldown -= 1;
        }

        let fault = match (mv.target - self.position).try_normalize() {
            Some(desired) => {
                self.steer(desired, first_turn);
                None
            }
            None => Some(EngineFault::DegenerateGeometry("move target on pod position")),
        };

        self.velocity += self.heading * acceleration;

        self.made_progress = false;
        self.progress_time = 0.0;

        fault
    }

    fn acceleration(&mut self, action: Action, boosts_available: &mut u32) -> f64 {
        if action == Action::Shield {
            self.mass = SHIELD_MASS;
            self.shield_cooldown = SHIELD_COOLDOWN;
        } else {
            self.mass = NORMAL_MASS;
        }

        if self.shield_cooldown > 0 {
            return 0.0;
        }

        match action {
            Action::Boost if *boosts_available > 0 => {
                *boosts_available -= 1;
                BOOST_ACCELERATION
            }
            Action::Boost => SPENT_BOOST_ACCELERATION,
            Action::Thrust(thrust) => thrust as f64,
            Action::Shield => 0.0,
        }
    }

    fn steer(&mut self, desired: Vec2, first_turn: bool) {
        let dot = self.heading.dot(desired).clamp(-1.0, 1.0);
        let angle = dot.acos();

        if angle < MAX_TURN_ANGLE || first_turn {
            self.heading = desired;
        } else {
            let cross = self.heading.cross(desired);
            let step = if cross > 0.0 {
                MAX_TURN_ANGLE
            } else {
                -MAX_TURN_ANGLE
            };
            self.heading = self.heading.rotate(step);
        }
    }

    /// Move along the current velocity for `dt` of a turn
    pub fn advance(&mut self, dt: f64) {
        self.position += self.velocity * dt;
    }

    /// Record reaching the next checkpoint at elapsed turn time `time`
    pub fn make_progress(&mut self, time: f64, checkpoint_count: usize) {
        self.made_progress = true;
        self.progress_time = time;

        self.next_checkpoint += 1;
        if self.next_checkpoint >= checkpoint_count {
            self.next_checkpoint = 0;
            self.lap += 1;
        }
    }

    /// Friction, then truncate velocity and round position
    pub fn end_turn(&mut self) {
        self.velocity *= FRICTION;
        self.velocity = self.velocity.truncate();
        self.position = self.position.round();
    }

    /// Elastic collision between two pods that are touching
    pub fn collide(first: &mut Pod, second: &mut Pod) -> Result<(), EngineFault> {
        let impulse = PhysicsSystem::collision_impulse(
            first.position,
            first.velocity,
            first.mass,
            second.position,
            second.velocity,
            second.mass,
        )?;

        first.velocity += impulse.elastic * (1.0 / first.mass);
        second.velocity -= impulse.elastic * (1.0 / second.mass);

        first.velocity += impulse.bounce * (1.0 / first.mass);
        second.velocity -= impulse.bounce * (1.0 / second.mass);

        Ok(())
    }
}

#[cfg(test)]
impl Pod {
    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub(crate) fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub(crate) fn set_next_checkpoint(&mut self, index: usize) {
        self.next_checkpoint = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn pod_at_origin() -> Pod {
        Pod::new(Vec2::ZERO, Vec2::new(1.0, 0.0))
    }

    #[test]
    fn test_new_pod_aims_past_checkpoint_zero() {
        let pod = pod_at_origin();
        assert_eq!(pod.next_checkpoint(), 1);
        assert_eq!(pod.lap(), 0);
        assert_eq!(pod.mass(), NORMAL_MASS);
    }

    #[test]
    fn test_placed_pod_is_rounded_and_aimed() {
        let pod = Pod::placed(
            Vec2::new(1000.0, 1000.0),
            Vec2::new(0.6, 0.8),
            -500.5,
            Vec2::new(5000.0, 1000.0),
        );
        assert_eq!(pod.position(), Vec2::new(700.0, 600.0));
        assert!((pod.heading().length() - 1.0).abs() < EPS);
        assert!(pod.heading().x > 0.0);
    }

    #[test]
    fn test_thrust_adds_along_heading() {
        let mut pod = pod_at_origin();
        let mut boosts = 1;
        let fault = pod.apply_controls(&Move::thrust(1000, 0, 80), &mut boosts, false);
        assert!(fault.is_none());
        assert_eq!(pod.velocity(), Vec2::new(80.0, 0.0));
        assert_eq!(boosts, 1);
    }

    #[test]
    fn test_boost_is_consumed_once() {
        let mut pod = pod_at_origin();
        let mut boosts = 1;
        let boost = Move::new(Vec2::new(1000.0, 0.0), Action::Boost);

        pod.apply_controls(&boost, &mut boosts, false);
        assert_eq!(boosts, 0);
        assert!((pod.velocity().x - BOOST_ACCELERATION).abs() < EPS);

        pod.apply_controls(&boost, &mut boosts, false);
        assert!((pod.velocity().x - BOOST_ACCELERATION - SPENT_BOOST_ACCELERATION).abs() < EPS);
    }

    #[test]
    fn test_shield_blocks_acceleration_for_four_turns() {
        let mut pod = pod_at_origin();
        let mut boosts = 1;
        let target = Vec2::new(1000.0, 0.0);

        pod.apply_controls(&Move::new(target, Action::Shield), &mut boosts, false);
        assert_eq!(pod.mass(), SHIELD_MASS);
        assert_eq!(pod.velocity(), Vec2::ZERO);

        for _ in 0..3 {
            pod.apply_controls(&Move::new(target, Action::Boost), &mut boosts, false);
            assert_eq!(pod.mass(), NORMAL_MASS);
            assert_eq!(pod.velocity(), Vec2::ZERO);
        }
        // Boost allowance survives the cooldown
        assert_eq!(boosts, 1);
        assert_eq!(pod.shield_cooldown(), 0);

        pod.apply_controls(&Move::new(target, Action::Thrust(100)), &mut boosts, false);
        assert_eq!(pod.velocity(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_turn_is_limited_to_eighteen_degrees() {
        let mut pod = pod_at_origin();
        let mut boosts = 0;
        pod.apply_controls(&Move::thrust(0, 1000, 0), &mut boosts, false);

        let expected = MAX_TURN_ANGLE;
        let actual = pod.heading().y.atan2(pod.heading().x);
        assert!((actual - expected).abs() < EPS);

        // Clockwise target rotates the other way
        let mut pod = pod_at_origin();
        pod.apply_controls(&Move::thrust(0, -1000, 0), &mut boosts, false);
        let actual = pod.heading().y.atan2(pod.heading().x);
        assert!((actual + expected).abs() < EPS);
    }

    #[test]
    fn test_small_turn_snaps_to_target() {
        let mut pod = pod_at_origin();
        let mut boosts = 0;
        pod.apply_controls(&Move::thrust(1000, 100, 0), &mut boosts, false);
        let desired = Vec2::new(1000.0, 100.0).try_normalize().unwrap();
        assert!((pod.heading() - desired).length() < EPS);
    }

    #[test]
    fn test_first_turn_snaps_any_angle() {
        let mut pod = pod_at_origin();
        let mut boosts = 0;
        pod.apply_controls(&Move::thrust(-1000, 0, 0), &mut boosts, true);
        assert!((pod.heading() - Vec2::new(-1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_target_on_pod_keeps_heading() {
        let mut pod = pod_at_origin();
        let mut boosts = 0;
        let fault = pod.apply_controls(&Move::thrust(0, 0, 50), &mut boosts, false);
        assert!(matches!(fault, Some(EngineFault::DegenerateGeometry(_))));
        assert_eq!(pod.heading(), Vec2::new(1.0, 0.0));
        assert_eq!(pod.velocity(), Vec2::new(50.0, 0.0));
        assert!(!pod.velocity().x.is_nan());
    }

    #[test]
    fn test_friction_decays_speed_monotonically() {
        let mut pod = pod_at_origin();
        let mut boosts = 0;
        pod.apply_controls(&Move::thrust(1000, 300, 100), &mut boosts, true);
        pod.end_turn();

        let mut last = pod.velocity().length();
        for _ in 0..60 {
            pod.advance(1.0);
            pod.end_turn();
            let speed = pod.velocity().length();
            assert!(speed <= last);
            assert!(speed >= 0.0);
            assert!(pod.velocity().x >= 0.0 && pod.velocity().y >= 0.0);
            last = speed;
        }
        assert_eq!(pod.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_end_turn_truncates_and_rounds() {
        let mut pod = pod_at_origin();
        pod.set_velocity(Vec2::new(99.0, -99.0));
        pod.set_position(Vec2::new(10.5, -10.4));
        pod.end_turn();
        // 99 * 0.85 = 84.15
        assert_eq!(pod.velocity(), Vec2::new(84.0, -84.0));
        assert_eq!(pod.position(), Vec2::new(11.0, -10.0));
    }

    #[test]
    fn test_checkpoint_index_wraps_and_counts_laps() {
        let mut pod = pod_at_origin();
        let mut seen = Vec::new();
        for step in 0..8 {
            pod.make_progress(0.5, 4);
            seen.push((pod.next_checkpoint(), pod.lap()));
            assert!(pod.made_progress());
            if step < 2 {
                assert_eq!(pod.lap(), 0);
            }
        }
        assert_eq!(
            seen,
            vec![
                (2, 0),
                (3, 0),
                (0, 1),
                (1, 1),
                (2, 1),
                (3, 1),
                (0, 2),
                (1, 2)
            ]
        );
    }

    #[test]
    fn test_three_laps_of_four_checkpoints_wins() {
        let mut pod = pod_at_origin();
        // 1 -> 2 -> 3 -> 0 is four crossings per lap
        for _ in 0..8 {
            pod.make_progress(0.1, 4);
            assert!(!pod.has_won(3));
        }
        assert_eq!(pod.lap(), 2);
        assert_eq!(pod.next_checkpoint(), 1);

        for _ in 0..3 {
            pod.make_progress(0.1, 4);
            assert!(!pod.has_won(3));
        }
        assert_eq!(pod.lap(), 3);
        assert_eq!(pod.next_checkpoint(), 0);

        pod.make_progress(0.7, 4);
        assert!(pod.has_won(3));
        assert_eq!(pod.progress_time(), 0.7);
        assert_eq!(pod.checkpoints_passed(4), 13);
    }

    #[test]
    fn test_collide_equal_mass_head_on() {
        let mut a = Pod::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        let mut b = Pod::new(Vec2::new(800.0, 0.0), Vec2::new(-1.0, 0.0));
        a.set_velocity(Vec2::new(100.0, 0.0));
        b.set_velocity(Vec2::new(-100.0, 0.0));

        Pod::collide(&mut a, &mut b).unwrap();

        assert!((a.velocity().x + 120.0).abs() < EPS);
        assert!((b.velocity().x - 120.0).abs() < EPS);
        assert!(b.velocity().x - a.velocity().x > 0.0);
    }

    #[test]
    fn test_shielded_pod_barely_moves_in_collision() {
        let mut boosts = 0;
        let mut heavy = Pod::new(Vec2::new(800.0, 0.0), Vec2::new(-1.0, 0.0));
        heavy.apply_controls(&Move::new(Vec2::ZERO, Action::Shield), &mut boosts, false);
        let mut light = Pod::new(Vec2::ZERO, Vec2::new(1.0, 0.0));
        light.set_velocity(Vec2::new(300.0, 0.0));

        Pod::collide(&mut light, &mut heavy).unwrap();

        assert!(light.velocity().x < 0.0);
        assert!(heavy.velocity().x > 0.0);
        assert!(heavy.velocity().x.abs() < light.velocity().x.abs());
    }
}
