//! Simulation context handed to every agent update.
//!
//! Agents never reach for globals: the furniture registry, room geometry,
//! clock, randomness and effect outbox all arrive through [`SimContext`].

use hecs::World;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::components::Vec3;
use crate::effects::Effects;
use crate::systems::Spatial;

/// Room geometry provider
pub trait RoomGeometry {
    /// Symmetric half-extent of the walkable floor on both axes
    fn boundary(&self) -> f32;

    /// Floor height under a point
    fn floor_height(&self, x: f32, z: f32) -> f32;
}

/// Square room with a level floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatRoom {
    pub boundary: f32,
    pub floor_height: f32,
}

impl Default for FlatRoom {
    fn default() -> Self {
        Self {
            boundary: 4.0,
            floor_height: 0.0,
        }
    }
}

impl FlatRoom {
    pub fn new(boundary: f32) -> Self {
        Self {
            boundary,
            floor_height: 0.0,
        }
    }
}

impl RoomGeometry for FlatRoom {
    fn boundary(&self) -> f32 {
        self.boundary
    }

    fn floor_height(&self, _x: f32, _z: f32) -> f32 {
        self.floor_height
    }
}

/// Converts world positions to screen coordinates for UI overlays
pub trait Projector {
    fn world_to_screen(&self, world: Vec3) -> Option<(f32, f32)>;
}

/// Hour-of-day clock driven by simulated time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayClock {
    /// Current hour, 0.0..24.0
    pub hour: f32,
    /// Real seconds per in-world day
    pub day_length_secs: f32,
    pub night_start: f32,
    pub night_end: f32,
}

impl Default for DayClock {
    fn default() -> Self {
        Self {
            hour: 12.0,
            day_length_secs: 86_400.0,
            night_start: 20.0,
            night_end: 6.0,
        }
    }
}

impl DayClock {
    pub fn at_hour(hour: f32) -> Self {
        Self {
            hour: hour.rem_euclid(24.0),
            ..Default::default()
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if self.day_length_secs <= 0.0 || !dt.is_finite() {
            return;
        }
        self.hour = (self.hour + dt * 24.0 / self.day_length_secs).rem_euclid(24.0);
    }

    pub fn is_night(&self) -> bool {
        if self.night_start > self.night_end {
            self.hour >= self.night_start || self.hour < self.night_end
        } else {
            (self.night_start..self.night_end).contains(&self.hour)
        }
    }
}

/// Everything an agent may touch during one tick
pub struct SimContext<'a> {
    /// Furniture registry (and the other agents' components)
    pub world: &'a World,
    pub room: &'a dyn RoomGeometry,
    pub clock: &'a DayClock,
    pub rng: &'a mut StdRng,
    pub effects: &'a mut Effects,
}

impl<'a> SimContext<'a> {
    pub fn new(
        world: &'a World,
        room: &'a dyn RoomGeometry,
        clock: &'a DayClock,
        rng: &'a mut StdRng,
        effects: &'a mut Effects,
    ) -> Self {
        Self {
            world,
            room,
            clock,
            rng,
            effects,
        }
    }

    pub fn spatial(&self) -> Spatial<'a> {
        Spatial::new(self.world, self.room)
    }

    pub fn is_night(&self) -> bool {
        self.clock.is_night()
    }
}
