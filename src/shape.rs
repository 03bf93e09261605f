//! Sphere geometry and proximity queries against the tool.

use glam::DVec3;

/// A sphere in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius: f64,
    pub position: DVec3,
}

impl Sphere {
    pub fn new(radius: f64, position: DVec3) -> Self {
        Self { radius, position }
    }

    /// Distance from the sphere centre to `point`.
    #[inline]
    pub fn distance_to(&self, point: DVec3) -> f64 {
        (self.position - point).length()
    }

    /// Signed distance from the surface to `point`, negative inside.
    #[inline]
    pub fn surface_distance(&self, point: DVec3) -> f64 {
        self.distance_to(point) - self.radius
    }

    /// Unit vector from the centre toward `point`.
    ///
    /// At the exact centre the direction is undefined and +X is returned.
    pub fn outward_normal(&self, point: DVec3) -> DVec3 {
        (point - self.position).try_normalize().unwrap_or(DVec3::X)
    }

    /// Whether `point` lies within `radius + margin` of the centre.
    #[inline]
    pub fn contains(&self, point: DVec3, margin: f64) -> bool {
        self.distance_to(point) < self.radius + margin
    }
}
