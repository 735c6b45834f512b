//! Rapier-held static scene geometry and ray queries (Z up).
#![forbid(unsafe_code)]

use rapier3d::prelude::*;
use tracing::debug;

const FLOOR_HALF_THICKNESS: Real = 0.1;

#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub collider: ColliderHandle,
    pub point: Point<Real>,
    pub distance: Real,
}

/// Scene geometry the character moves through. Colliders are static; the
/// query pipeline is refreshed on every insert/remove so queries always see
/// the current set.
pub struct PhysicsWorld {
    island_manager: IslandManager,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            island_manager: IslandManager::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn insert_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        let handle = self.colliders.insert(collider);
        self.query_pipeline.update(&self.colliders);
        handle
    }

    /// Inserts a flat slab whose top face sits at `height`.
    pub fn insert_floor(&mut self, height: Real, half_extent: Real) -> ColliderHandle {
        debug!(height, half_extent, "inserting floor slab");
        let floor = ColliderBuilder::cuboid(half_extent, half_extent, FLOOR_HALF_THICKNESS)
            .translation(vector![0.0, 0.0, height - FLOOR_HALF_THICKNESS])
            .build();
        self.insert_static_collider(floor)
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Option<Collider> {
        let removed =
            self.colliders
                .remove(handle, &mut self.island_manager, &mut self.bodies, false);
        self.query_pipeline.update(&self.colliders);
        removed
    }

    /// Nearest hit along `direction` (unit length) within `max_distance`.
    pub fn cast_ray(
        &self,
        origin: Point<Real>,
        direction: Vector<Real>,
        max_distance: Real,
    ) -> Option<RayHit> {
        let ray = Ray::new(origin, direction);
        let (collider, distance) = self.query_pipeline.cast_ray(
            &self.bodies,
            &self.colliders,
            &ray,
            max_distance,
            true,
            QueryFilter::default(),
        )?;
        Some(RayHit {
            collider,
            point: ray.point_at(distance),
            distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down() -> Vector<Real> {
        vector![0.0, 0.0, -1.0]
    }

    #[test]
    fn ray_reaches_floor_top() {
        let mut world = PhysicsWorld::new();
        world.insert_floor(2.0, 5.0);

        let hit = world
            .cast_ray(point![0.0, 0.0, 3.0], down(), 5.0)
            .expect("floor hit");
        assert!((hit.point.z - 2.0).abs() < 1.0e-4);
        assert!((hit.distance - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn ray_respects_max_distance() {
        let mut world = PhysicsWorld::new();
        world.insert_floor(0.0, 5.0);

        assert!(world.cast_ray(point![0.0, 0.0, 3.0], down(), 1.0).is_none());
    }

    #[test]
    fn empty_world_has_no_hits() {
        let world = PhysicsWorld::new();
        assert_eq!(world.collider_count(), 0);
        assert!(world.cast_ray(point![0.0, 0.0, 3.0], down(), 100.0).is_none());
    }

    #[test]
    fn removed_collider_stops_blocking() {
        let mut world = PhysicsWorld::new();
        let floor = world.insert_floor(0.0, 5.0);
        assert!(world.cast_ray(point![1.0, 1.0, 0.5], down(), 1.0).is_some());

        assert!(world.remove_collider(floor).is_some());
        assert!(world.cast_ray(point![1.0, 1.0, 0.5], down(), 1.0).is_none());
    }
}
