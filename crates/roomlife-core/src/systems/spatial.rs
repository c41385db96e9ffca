//! Spatial query service - obstacle and boundary tests against the live registry.
//!
//! Every query walks the registry; at the scale of a single room that is
//! cheaper than maintaining an index that furniture edits would invalidate.

use hecs::{Entity, World};

use crate::components::{Furniture, Transform, Vec3};
use crate::context::RoomGeometry;

/// Collision radius of the robot vacuum
pub const APPLIANCE_RADIUS: f32 = 0.35;

/// Closest thing a sensor ran into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// `None` for the room boundary
    pub entity: Option<Entity>,
    pub distance: f32,
}

/// Read-only view over the registry and room bounds
#[derive(Clone, Copy)]
pub struct Spatial<'a> {
    world: &'a World,
    room: &'a dyn RoomGeometry,
}

impl<'a> Spatial<'a> {
    pub fn new(world: &'a World, room: &'a dyn RoomGeometry) -> Self {
        Self { world, room }
    }

    pub fn boundary(&self) -> f32 {
        self.room.boundary()
    }

    /// True if `point` lies inside the margin-expanded footprint of anything a
    /// vehicle must avoid: floor-layer, not wall-mounted, not a vehicle, not
    /// `exclude`.
    pub fn has_obstacle_at(&self, point: Vec3, margin: f32, exclude: Option<Entity>) -> bool {
        self.world
            .query::<(&Furniture, &Transform)>()
            .iter()
            .filter(|(entity, _)| Some(*entity) != exclude)
            .filter(|(_, (furniture, _))| furniture.blocks_vehicles())
            .any(|(_, (furniture, transform))| {
                furniture.bounds(transform).expanded(margin).contains_flat(&point)
            })
    }

    /// True if either floor coordinate is past `boundary - threshold`.
    pub fn is_near_boundary(&self, point: Vec3, threshold: f32) -> bool {
        let limit = self.room.boundary() - threshold;
        point.x.abs() > limit || point.z.abs() > limit
    }

    /// Cast a floor-plane ray against the room walls and every registry item
    /// accepted by `filter`. Only hits within `max_distance` count.
    pub fn raycast<F>(&self, origin: Vec3, dir: Vec3, max_distance: f32, filter: F) -> Option<RayHit>
    where
        F: Fn(Entity, &Furniture) -> bool,
    {
        let dir = dir.flat().normalize();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut best = self.wall_distance(origin, dir).map(|distance| RayHit {
            entity: None,
            distance,
        });

        for (entity, (furniture, transform)) in self.world.query::<(&Furniture, &Transform)>().iter() {
            if !filter(entity, furniture) {
                continue;
            }
            if let Some(distance) = furniture.bounds(transform).ray_flat(&origin, &dir) {
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(RayHit {
                        entity: Some(entity),
                        distance,
                    });
                }
            }
        }

        best.filter(|hit| hit.distance <= max_distance)
    }

    /// Distance along `dir` to the first room wall.
    fn wall_distance(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let b = self.room.boundary();
        let mut nearest: Option<f32> = None;
        for (o, d) in [(origin.x, dir.x), (origin.z, dir.z)] {
            let t = if d > 1e-6 {
                (b - o) / d
            } else if d < -1e-6 {
                (-b - o) / d
            } else {
                continue;
            };
            let t = t.max(0.0);
            nearest = Some(nearest.map_or(t, |n| n.min(t)));
        }
        nearest
    }

    /// Height of the highest pet-supporting surface under `point`, or the floor.
    pub fn surface_height(&self, point: Vec3, exclude: Option<Entity>) -> f32 {
        let floor = self.room.floor_height(point.x, point.z);
        self.world
            .query::<(&Furniture, &Transform)>()
            .iter()
            .filter(|(entity, _)| Some(*entity) != exclude)
            .filter(|(_, (furniture, _))| furniture.supports_pets())
            .filter_map(|(_, (furniture, transform))| {
                let bounds = furniture.bounds(transform);
                bounds.contains_flat(&point).then_some(bounds.max.y)
            })
            .fold(floor, f32::max)
    }

    /// Pull a floor point back inside the room, `margin` away from the walls.
    pub fn clamp_to_room(&self, point: Vec3, margin: f32) -> Vec3 {
        let limit = (self.room.boundary() - margin).max(0.0);
        Vec3::new(point.x.clamp(-limit, limit), point.y, point.z.clamp(-limit, limit))
    }

    /// True while `entity` is in the registry and visible.
    pub fn is_live(&self, entity: Entity) -> bool {
        self.world
            .get::<&Furniture>(entity)
            .map(|furniture| furniture.visible)
            .unwrap_or(false)
    }

    /// Live and visible registry item.
    pub fn furniture(&self, entity: Entity) -> Option<(Furniture, Transform)> {
        let furniture = self.world.get::<&Furniture>(entity).ok()?;
        if !furniture.visible {
            return None;
        }
        let transform = self.world.get::<&Transform>(entity).ok()?;
        Some(((*furniture).clone(), *transform))
    }

    /// Every live, visible item matching `pred`, in registry order.
    pub fn find_furniture<F>(&self, pred: F) -> Vec<(Entity, Transform)>
    where
        F: Fn(Entity, &Furniture) -> bool,
    {
        self.world
            .query::<(&Furniture, &Transform)>()
            .iter()
            .filter(|(entity, (furniture, _))| furniture.visible && pred(*entity, furniture))
            .map(|(entity, (_, transform))| (entity, *transform))
            .collect()
    }
}
