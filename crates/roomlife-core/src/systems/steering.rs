//! Steering primitive - point-to-point walking with arrival detection and a
//! fixed-angle avoidance fallback.
//!
//! Algorithm per tick:
//! 1. Look forward toward the stop point (short lookahead)
//! 2. Blocked: try six detour headings (±45°, ±90°, ±135°) and walk a short
//!    leg along the first clear one
//! 3. Reaching the end of a detour leg re-anchors on the real target from
//!    wherever the agent now stands
//! 4. Otherwise advance at walking speed and face the direction of travel
//!
//! Ten avoidance attempts without a clean step give up the goal.

use std::f32::consts::FRAC_PI_4;

use crate::components::Vec3;

/// Walking speed in units per second
pub const WALK_SPEED: f32 = 2.0;
/// Forward sensor length
pub const LOOKAHEAD: f32 = 0.4;
/// Remaining distance that counts as arrived
pub const ARRIVAL_DISTANCE: f32 = 0.1;
/// A detour heading is acceptable if its sensor is clear this far
pub const DETOUR_CLEARANCE: f32 = 1.0;
/// Length of a detour leg
pub const DETOUR_LENGTH: f32 = 0.8;
/// Avoidance attempts before the goal is abandoned
pub const MAX_AVOID_ATTEMPTS: u32 = 10;

/// Detour offsets from the blocked heading, in priority order
const DETOUR_OFFSETS: [f32; 6] = [
    FRAC_PI_4,
    -FRAC_PI_4,
    2.0 * FRAC_PI_4,
    -2.0 * FRAC_PI_4,
    3.0 * FRAC_PI_4,
    -3.0 * FRAC_PI_4,
];

/// Forward obstacle sensor used by the steering step
pub trait ObstacleSensor {
    /// Distance to the first obstacle along `dir` within `max_distance`.
    fn sense(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32>;
}

impl<F> ObstacleSensor for F
where
    F: Fn(Vec3, Vec3, f32) -> Option<f32>,
{
    fn sense(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        self(origin, dir, max_distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteerOutcome {
    /// New position and facing for this tick
    Moved { position: Vec3, facing: f32 },
    /// Took a detour heading; no movement this tick
    Rerouted,
    /// Every detour heading was blocked; no movement this tick
    Blocked,
    Arrived,
    /// Avoidance exhausted; the path has been cleared
    GaveUp,
}

/// Path state for one walking agent
#[derive(Debug, Clone, Default)]
pub struct Steering {
    active: bool,
    /// Where the agent will stop
    stop_point: Vec3,
    /// The real target the stop point was derived from
    original_target: Vec3,
    stop_distance: f32,
    is_avoiding: bool,
    avoid_counter: u32,
}

impl Steering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Head for `target`, halting `stop_distance` short of it on the approach line.
    pub fn set_path(&mut self, from: Vec3, target: Vec3, stop_distance: f32) {
        self.active = true;
        self.original_target = target;
        self.stop_distance = stop_distance.max(0.0);
        self.stop_point = pull_back(from, target, self.stop_distance);
        self.is_avoiding = false;
        self.avoid_counter = 0;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_avoiding(&self) -> bool {
        self.is_avoiding
    }

    pub fn avoid_attempts(&self) -> u32 {
        self.avoid_counter
    }

    pub fn stop_point(&self) -> Vec3 {
        self.stop_point
    }

    pub fn target(&self) -> Vec3 {
        self.original_target
    }

    pub fn stop_distance(&self) -> f32 {
        self.stop_distance
    }

    /// Advance one tick from `position`.
    pub fn step(
        &mut self,
        position: Vec3,
        dt: f32,
        speed: f32,
        sensor: &impl ObstacleSensor,
    ) -> SteerOutcome {
        if !self.active {
            return SteerOutcome::Arrived;
        }

        let mut to_stop = (self.stop_point - position).flat();
        let mut remaining = to_stop.length();

        if remaining < ARRIVAL_DISTANCE {
            if !self.is_avoiding {
                self.active = false;
                return SteerOutcome::Arrived;
            }
            // End of a detour leg: aim at the real target from here
            self.is_avoiding = false;
            self.stop_point = pull_back(position, self.original_target, self.stop_distance);
            to_stop = (self.stop_point - position).flat();
            remaining = to_stop.length();
            if remaining < ARRIVAL_DISTANCE {
                self.active = false;
                return SteerOutcome::Arrived;
            }
        }

        let dir = to_stop * (1.0 / remaining);
        let lookahead = LOOKAHEAD.min(remaining);
        if let Some(hit) = sensor.sense(position, dir, lookahead) {
            if hit < lookahead {
                return self.avoid(position, dir, sensor);
            }
        }

        if !self.is_avoiding {
            self.avoid_counter = 0;
        }

        let step = (speed.max(0.0) * dt.max(0.0)).min(remaining);
        SteerOutcome::Moved {
            position: position + dir * step,
            facing: dir.heading(),
        }
    }

    fn avoid(&mut self, position: Vec3, blocked: Vec3, sensor: &impl ObstacleSensor) -> SteerOutcome {
        self.avoid_counter += 1;
        if self.avoid_counter >= MAX_AVOID_ATTEMPTS {
            self.clear();
            return SteerOutcome::GaveUp;
        }

        let base = blocked.heading();
        for offset in DETOUR_OFFSETS {
            let heading = Vec3::from_heading(base + offset);
            let clear = match sensor.sense(position, heading, DETOUR_CLEARANCE + DETOUR_LENGTH) {
                None => true,
                Some(hit) => hit > DETOUR_CLEARANCE,
            };
            if clear {
                self.stop_point = position + heading * DETOUR_LENGTH;
                self.is_avoiding = true;
                return SteerOutcome::Rerouted;
            }
        }

        SteerOutcome::Blocked
    }
}

/// `target` moved `stop_distance` back toward `from`. Never overshoots past `from`.
fn pull_back(from: Vec3, target: Vec3, stop_distance: f32) -> Vec3 {
    let offset = (target - from).flat();
    let distance = offset.length();
    if distance <= stop_distance {
        return Vec3::new(from.x, target.y, from.z);
    }
    target - offset * (stop_distance / distance)
}
