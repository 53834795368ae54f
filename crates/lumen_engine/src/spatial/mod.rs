//! Spatial volume hierarchy
//!
//! Broad-phase index over every culled scene component. The hierarchy cheaply
//! narrows candidates by cell region, then eliminates false positives with
//! the exact predicates from [`crate::scene::volume`].
//!
//! Implementations are pluggable behind [`VolumeHierarchy`]; the engine ships
//! [`UniformTree`] for real scenes and [`LinearHierarchy`] as a brute-force
//! reference.

mod uniform_tree;

pub use uniform_tree::{UniformTree, UniformTreeConfig};

use slotmap::SecondaryMap;

use crate::scene::volume::{Bounds, QueryVolume};
use crate::scene::ComponentId;

/// Trait for spatial indexes over registered volume components.
///
/// Registration discipline: every id is registered at most once, removed
/// exactly once, and never queried or relocated after removal. Violations are
/// programming errors and panic rather than being reported as results.
pub trait VolumeHierarchy {
    /// Register a component's bound. Panics if `id` is already registered.
    fn add_volume(&mut self, id: ComponentId, bounds: Bounds);

    /// Unregister a component. Panics if `id` is not registered.
    fn remove_volume(&mut self, id: ComponentId);

    /// Relocate a component after its bound changed.
    /// Panics if `id` is not registered.
    fn update_volume(&mut self, id: ComponentId, bounds: Bounds);

    /// Every registered component whose bound intersects the query shape.
    /// Exact (no false positives, no false negatives); order unspecified.
    fn intersections(&self, query: &QueryVolume) -> Vec<ComponentId>;

    /// Number of registered components
    fn volume_count(&self) -> usize;

    /// Unregister everything
    fn clear(&mut self);
}

/// Brute-force [`VolumeHierarchy`]: a flat map tested linearly.
///
/// No spatial optimization. Sufficient for small scenes and used as the
/// reference implementation in differential tests.
#[derive(Default)]
pub struct LinearHierarchy {
    volumes: SecondaryMap<ComponentId, Bounds>,
}

impl LinearHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self {
            volumes: SecondaryMap::new(),
        }
    }
}

impl VolumeHierarchy for LinearHierarchy {
    fn add_volume(&mut self, id: ComponentId, bounds: Bounds) {
        assert!(
            self.volumes.insert(id, bounds).is_none(),
            "volume registered twice in hierarchy"
        );
    }

    fn remove_volume(&mut self, id: ComponentId) {
        assert!(
            self.volumes.remove(id).is_some(),
            "removing a volume that is not registered"
        );
    }

    fn update_volume(&mut self, id: ComponentId, bounds: Bounds) {
        let slot = self
            .volumes
            .get_mut(id)
            .expect("updating a volume that is not registered");
        *slot = bounds;
    }

    fn intersections(&self, query: &QueryVolume) -> Vec<ComponentId> {
        self.volumes
            .iter()
            .filter(|(_, bounds)| query.intersects_bounds(bounds))
            .map(|(id, _)| id)
            .collect()
    }

    fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    fn clear(&mut self) {
        self.volumes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::volume::Aabb;
    use slotmap::SlotMap;

    fn make_ids(n: usize) -> (SlotMap<ComponentId, ()>, Vec<ComponentId>) {
        let mut map = SlotMap::with_key();
        let ids = (0..n).map(|_| map.insert(())).collect();
        (map, ids)
    }

    #[test]
    fn test_linear_add_query_remove() {
        let (_map, ids) = make_ids(2);
        let mut hierarchy = LinearHierarchy::new();

        hierarchy.add_volume(
            ids[0],
            Bounds::Aabb(Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))),
        );
        hierarchy.add_volume(
            ids[1],
            Bounds::Aabb(Aabb::new(
                Vec3::new(5.0, 5.0, 5.0),
                Vec3::new(6.0, 6.0, 6.0),
            )),
        );

        let query = QueryVolume::Aabb(Aabb::new(
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(2.0, 2.0, 2.0),
        ));
        assert_eq!(hierarchy.intersections(&query), vec![ids[0]]);

        hierarchy.remove_volume(ids[0]);
        assert!(hierarchy.intersections(&query).is_empty());
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_linear_double_remove_fails_fast() {
        let (_map, ids) = make_ids(1);
        let mut hierarchy = LinearHierarchy::new();

        hierarchy.add_volume(ids[0], Bounds::Aabb(Aabb::point(Vec3::zeros())));
        hierarchy.remove_volume(ids[0]);
        hierarchy.remove_volume(ids[0]);
    }
}
