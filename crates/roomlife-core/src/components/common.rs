//! Common components used across agents and furniture.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// 3D position vector. `y` is up; the floor is the `x`/`z` plane.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point on the floor plane.
    pub fn ground(x: f32, z: f32) -> Self {
        Self { x, y: 0.0, z }
    }

    /// Unit vector on the floor plane for a yaw angle (0 faces +z).
    pub fn from_heading(angle: f32) -> Self {
        Self {
            x: angle.sin(),
            y: 0.0,
            z: angle.cos(),
        }
    }

    /// Yaw angle of this vector projected on the floor plane.
    pub fn heading(&self) -> f32 {
        self.x.atan2(self.z)
    }

    /// Same vector with the vertical component dropped.
    pub fn flat(&self) -> Self {
        Self {
            x: self.x,
            y: 0.0,
            z: self.z,
        }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Distance on the floor plane, ignoring height.
    pub fn flat_distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// Wrap an angle into (-PI, PI].
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Axis-aligned bounding volume
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box sitting on `base` with the given half extents on the floor plane.
    pub fn around(base: Vec3, half_x: f32, half_z: f32, height: f32) -> Self {
        Self {
            min: Vec3::new(base.x - half_x, base.y, base.z - half_z),
            max: Vec3::new(base.x + half_x, base.y + height, base.z + half_z),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    pub fn center(&self) -> Vec3 {
        self.min.lerp(&self.max, 0.5)
    }

    /// Grow the footprint by `margin` on every horizontal side.
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: Vec3::new(self.min.x - margin, self.min.y, self.min.z - margin),
            max: Vec3::new(self.max.x + margin, self.max.y, self.max.z + margin),
        }
    }

    /// Footprint test, ignoring height.
    pub fn contains_flat(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Half extent of the footprint along a floor direction.
    pub fn extent_along(&self, dir: &Vec3) -> f32 {
        dir.x.abs() * self.width() * 0.5 + dir.z.abs() * self.depth() * 0.5
    }

    /// Slab test on the floor plane. Returns the entry distance along `dir`
    /// (assumed normalized) or `None` when the ray misses. Rays starting inside
    /// the footprint never hit, so an agent can always walk off a surface.
    pub fn ray_flat(&self, origin: &Vec3, dir: &Vec3) -> Option<f32> {
        if self.contains_flat(origin) {
            return None;
        }

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for (o, d, lo, hi) in [
            (origin.x, dir.x, self.min.x, self.max.x),
            (origin.z, dir.z, self.min.z, self.max.z),
        ] {
            if d.abs() < 1e-6 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
            t_enter = t_enter.max(near);
            t_exit = t_exit.min(far);
        }

        if t_enter <= t_exit && t_exit >= 0.0 {
            Some(t_enter.max(0.0))
        } else {
            None
        }
    }
}

/// Placement of a registry object: floor position plus yaw
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: f32,
}

impl Transform {
    pub fn new(position: Vec3, rotation: f32) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        let sum = a + b;
        assert_eq!(sum.x, 5.0);
        assert_eq!(sum.y, 7.0);
        assert_eq!(sum.z, 9.0);

        let diff = b - a;
        assert_eq!(diff.x, 3.0);

        let scaled = a * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);
    }

    #[test]
    fn test_heading_round_trip() {
        let dir = Vec3::from_heading(PI / 2.0);
        assert!((dir.x - 1.0).abs() < 1e-5);
        assert!(dir.z.abs() < 1e-5);
        assert!((dir.heading() - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_ray_hits_box_ahead() {
        let bb = BoundingBox::around(Vec3::ground(2.0, 0.0), 0.5, 0.5, 1.0);
        let hit = bb.ray_flat(&Vec3::ZERO, &Vec3::new(1.0, 0.0, 0.0));
        assert!((hit.unwrap() - 1.5).abs() < 1e-5);

        // Pointing away
        assert!(bb.ray_flat(&Vec3::ZERO, &Vec3::new(-1.0, 0.0, 0.0)).is_none());
        // Starting inside the footprint
        assert!(bb.ray_flat(&Vec3::ground(2.0, 0.0), &Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_extent_along() {
        let bb = BoundingBox::around(Vec3::ZERO, 1.0, 0.25, 1.0);
        assert!((bb.extent_along(&Vec3::new(1.0, 0.0, 0.0)) - 1.0).abs() < 1e-5);
        assert!((bb.extent_along(&Vec3::new(0.0, 0.0, 1.0)) - 0.25).abs() < 1e-5);
    }
}
