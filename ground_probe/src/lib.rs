//! Single downward ray ground probe.
//!
//! The probe casts from the character origin straight down (-Z) for the
//! floor clearance distance. Any hit means grounded; the nearest hit fixes
//! the height the character should rest at.
#![forbid(unsafe_code)]

use physics_rapier::PhysicsWorld;
use rapier3d::math::{Point, Vector};
use rapier3d::prelude::Real;

/// Slack added to the probe length so a character resting exactly at
/// clearance keeps reporting contact under float rounding.
pub const PROBE_TOLERANCE: Real = 1.0e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    pub point: Point<Real>,
    pub distance: Real,
}

/// Host scene geometry seen by the probe.
pub trait SceneQuery {
    /// Intersections of the ray from `origin` along -Z within `max_distance`,
    /// in any order. An empty scene returns an empty list.
    fn cast_downward_ray(&self, origin: Point<Real>, max_distance: Real) -> Vec<SurfaceHit>;
}

impl<T: SceneQuery + ?Sized> SceneQuery for &T {
    fn cast_downward_ray(&self, origin: Point<Real>, max_distance: Real) -> Vec<SurfaceHit> {
        (**self).cast_downward_ray(origin, max_distance)
    }
}

impl SceneQuery for PhysicsWorld {
    fn cast_downward_ray(&self, origin: Point<Real>, max_distance: Real) -> Vec<SurfaceHit> {
        self.cast_ray(origin, -Vector::z(), max_distance)
            .map(|hit| SurfaceHit {
                point: hit.point,
                distance: hit.distance,
            })
            .into_iter()
            .collect()
    }
}

/// Scene with no geometry; every probe reports airborne.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScene;

impl SceneQuery for EmptyScene {
    fn cast_downward_ray(&self, _origin: Point<Real>, _max_distance: Real) -> Vec<SurfaceHit> {
        Vec::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundContact {
    pub grounded: bool,
    /// Height the character origin should occupy to rest at clearance above
    /// the nearest surface. `None` while airborne.
    pub surface_z: Option<Real>,
}

impl GroundContact {
    pub const AIRBORNE: Self = Self {
        grounded: false,
        surface_z: None,
    };
}

#[derive(Clone, Copy, Debug)]
pub struct GroundProbe {
    floor_distance: Real,
}

impl GroundProbe {
    pub fn new(floor_distance: Real) -> Self {
        Self { floor_distance }
    }

    pub fn probe<S: SceneQuery + ?Sized>(&self, position: Point<Real>, scene: &S) -> GroundContact {
        let max_distance = self.floor_distance.max(0.0) + PROBE_TOLERANCE;
        let nearest = scene
            .cast_downward_ray(position, max_distance)
            .into_iter()
            .filter(|hit| hit.distance <= max_distance)
            .min_by(|a, b| a.distance.total_cmp(&b.distance));
        match nearest {
            Some(hit) => GroundContact {
                grounded: true,
                surface_z: Some(hit.point.z + self.floor_distance),
            },
            None => GroundContact::AIRBORNE,
        }
    }
}
