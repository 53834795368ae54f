//! Scene graph
//!
//! Owns the node tree, the component storage, the spatial hierarchy, and the
//! event bus, and keeps the four consistent through every mutation:
//! - World transforms are cached per node and recomputed top-down when a
//!   local transform or a parent link changes.
//! - Components reporting a world bound are registered in the hierarchy at
//!   attach time and relocated whenever their owning node moves.
//! - Destructive operations announce themselves on the bus *before* any state
//!   is torn down.

use slotmap::SlotMap;

use crate::events::{EventBus, SceneEvent};
use crate::foundation::math::{Mat4, Transform};
use crate::scene::component::{ComponentKind, ComponentVariant};
use crate::scene::volume::QueryVolume;
use crate::scene::{ComponentId, NodeId};
use crate::spatial::{UniformTree, UniformTreeConfig, VolumeHierarchy};

struct Node {
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Transform,
    world: Mat4,
    components: Vec<ComponentId>,
}

struct ComponentSlot {
    node: NodeId,
    kind: ComponentKind,
}

/// A tree of transform nodes carrying components, with spatial queries and
/// change notifications.
///
/// Node and component handles are generational: a handle to a destroyed node
/// or component never aliases a later one, and using it panics instead of
/// touching the wrong data.
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    components: SlotMap<ComponentId, ComponentSlot>,
    root: NodeId,
    hierarchy: Box<dyn VolumeHierarchy>,
    events: EventBus,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene indexed by a [`UniformTree`] with default domain and
    /// depth.
    pub fn new() -> Self {
        Self::with_hierarchy(Box::new(UniformTree::default()))
    }

    /// Create a scene indexed by a [`UniformTree`] with the given
    /// configuration.
    pub fn with_tree_config(config: UniformTreeConfig) -> Self {
        Self::with_hierarchy(Box::new(UniformTree::new(config)))
    }

    /// Create a scene over an arbitrary spatial hierarchy.
    pub fn with_hierarchy(hierarchy: Box<dyn VolumeHierarchy>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            name: Some("root".to_owned()),
            parent: None,
            children: Vec::new(),
            local: Transform::identity(),
            world: Mat4::identity(),
            components: Vec::new(),
        });

        Self {
            nodes,
            components: SlotMap::with_key(),
            root,
            hierarchy,
            events: EventBus::new(),
        }
    }

    /// The scene root. Always present, never destroyable.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create an unnamed node under the root.
    pub fn create_node(&mut self) -> NodeId {
        self.create_child(self.root)
    }

    /// Create an unnamed child of `parent`.
    pub fn create_child(&mut self, parent: NodeId) -> NodeId {
        self.spawn(parent, None)
    }

    /// Create a named child of `parent`.
    pub fn create_named_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.spawn(parent, Some(name.to_owned()))
    }

    fn spawn(&mut self, parent: NodeId, name: Option<String>) -> NodeId {
        let parent_world = self.node(parent).world;

        let id = self.nodes.insert(Node {
            name,
            parent: Some(parent),
            children: Vec::new(),
            local: Transform::identity(),
            world: parent_world,
            components: Vec::new(),
        });
        self.nodes[parent].children.push(id);

        id
    }

    /// Name of a node, if it was given one.
    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        self.node(node).name.as_deref()
    }

    /// Parent of a node. `None` only for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Children of a node, in attach order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// Whether `node` is `ancestor` or sits anywhere below it.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Move a node under a new parent, keeping its local transform.
    ///
    /// The node's world transform changes accordingly and the usual change
    /// notifications fire. Panics when `node` is the root, or when the move
    /// would make a node its own ancestor.
    pub fn set_parent(&mut self, node: NodeId, new_parent: NodeId) {
        assert!(node != self.root, "cannot reparent the scene root");
        assert!(
            !self.is_descendant_of(new_parent, node),
            "reparenting would create a cycle"
        );

        let old_parent = self.node(node).parent.unwrap_or(self.root);
        if old_parent == new_parent {
            return;
        }

        self.nodes[old_parent].children.retain(|child| *child != node);
        self.nodes[new_parent].children.push(node);
        self.nodes[node].parent = Some(new_parent);

        self.propagate_world(node);
    }

    /// Destroy a node.
    ///
    /// Fires `NodeDisposed` first, then removes the node's components (each
    /// with its own `ComponentRemoved`), then reparents the node's children
    /// to the node's parent with their local transforms intact. Panics when
    /// asked to destroy the root.
    pub fn destroy_node(&mut self, node: NodeId) {
        assert!(node != self.root, "cannot destroy the scene root");
        let parent = self
            .node(node)
            .parent
            .expect("non-root node always has a parent");

        log::debug!("destroying node {node:?}");
        self.events.emit(&SceneEvent::NodeDisposed { node });

        let attached: Vec<ComponentId> = self.nodes[node].components.clone();
        for component in attached {
            self.detach_component(component);
        }

        let children: Vec<NodeId> = self.nodes[node].children.clone();
        for child in children {
            self.nodes[child].parent = Some(parent);
            self.nodes[parent].children.push(child);
            self.propagate_world(child);
        }

        self.nodes[parent].children.retain(|child| *child != node);
        self.nodes.remove(node);
    }

    /// Attach a component to a node and return its handle.
    ///
    /// Components reporting a world bound are registered for spatial queries
    /// immediately.
    pub fn add_component<T: ComponentVariant>(&mut self, node: NodeId, component: T) -> ComponentId {
        let world = self.node(node).world;
        let kind = component.into_kind();
        let bounds = kind.world_bounds(&world);

        log::debug!("attaching {} component to node {node:?}", kind.name());

        let id = self.components.insert(ComponentSlot { node, kind });
        self.nodes[node].components.push(id);

        if let Some(bounds) = bounds {
            self.hierarchy.add_volume(id, bounds);
        }

        id
    }

    /// Detach and drop a component.
    ///
    /// Fires `ComponentRemoved` while the component is still readable.
    pub fn remove_component(&mut self, component: ComponentId) {
        // Validate the handle before announcing anything.
        let _ = self.component_slot(component);
        self.detach_component(component);
    }

    fn detach_component(&mut self, component: ComponentId) {
        let node = self.components[component].node;
        self.events.emit(&SceneEvent::ComponentRemoved { node, component });

        let slot = self
            .components
            .remove(component)
            .expect("component validated before detach");

        if slot.kind.world_bounds(&self.nodes[node].world).is_some() {
            self.hierarchy.remove_volume(component);
        }

        self.nodes[node].components.retain(|id| *id != component);
    }

    /// Borrow a component by handle, if it is of type `T`.
    pub fn component<T: ComponentVariant>(&self, component: ComponentId) -> Option<&T> {
        T::from_kind(&self.component_slot(component).kind)
    }

    /// The untyped kind of a component.
    pub fn component_kind(&self, component: ComponentId) -> &ComponentKind {
        &self.component_slot(component).kind
    }

    /// The node a component is attached to.
    pub fn component_node(&self, component: ComponentId) -> NodeId {
        self.component_slot(component).node
    }

    /// Every component of type `T` attached to `node`, in attach order.
    /// A node may carry several components of the same type.
    pub fn components_of<'a, T: ComponentVariant + 'a>(
        &'a self,
        node: NodeId,
    ) -> impl Iterator<Item = (ComponentId, &'a T)> {
        self.node(node)
            .components
            .iter()
            .filter_map(|id| T::from_kind(&self.components[*id].kind).map(|c| (*id, c)))
    }

    /// Mutate a component in place, keeping the spatial index and listeners
    /// in sync with any bound change.
    ///
    /// Panics when the component is not of type `T`.
    pub fn modify_component<T, F>(&mut self, component: ComponentId, mutate: F)
    where
        T: ComponentVariant,
        F: FnOnce(&mut T),
    {
        let node = self.component_slot(component).node;
        let world = self.nodes[node].world;

        let kind = &mut self.components[component].kind;
        let old_bounds = kind.world_bounds(&world);
        mutate(T::from_kind_mut(kind).expect("component is not of the requested type"));
        let new_bounds = self.components[component].kind.world_bounds(&world);

        match (old_bounds, new_bounds) {
            (Some(old), Some(new)) => {
                if old != new {
                    self.hierarchy.update_volume(component, new);
                    self.events.emit(&SceneEvent::BoundsChanged {
                        component,
                        old_bounds: old,
                        new_bounds: new,
                    });
                }
            }
            // A mutation may change the culling class, e.g. a point light
            // becoming directional. No bound-to-bound event exists for that;
            // the component simply enters or leaves the index.
            (Some(_), None) => self.hierarchy.remove_volume(component),
            (None, Some(new)) => self.hierarchy.add_volume(component, new),
            (None, None) => {}
        }
    }

    /// A node's transform relative to its parent.
    pub fn local_transform(&self, node: NodeId) -> &Transform {
        &self.node(node).local
    }

    /// A node's cached world matrix.
    pub fn world_transform(&self, node: NodeId) -> &Mat4 {
        &self.node(node).world
    }

    /// Replace a node's local transform.
    ///
    /// Recomputes world transforms for the node and its whole subtree,
    /// relocates every affected culled component, and fires
    /// `TransformChanged` / `BoundsChanged` along the way.
    pub fn set_local_transform(&mut self, node: NodeId, local: Transform) {
        let _ = self.node(node);
        self.nodes[node].local = local;
        self.propagate_world(node);
    }

    /// Every culled component whose world bound intersects `query`.
    pub fn intersections(&self, query: &QueryVolume) -> Vec<ComponentId> {
        self.hierarchy.intersections(query)
    }

    /// Number of components registered for spatial queries.
    pub fn culled_component_count(&self) -> usize {
        self.hierarchy.volume_count()
    }

    /// The event bus, for subscribing and unsubscribing listeners.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Total number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[track_caller]
    fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id).expect("node handle is stale or foreign")
    }

    #[track_caller]
    fn component_slot(&self, id: ComponentId) -> &ComponentSlot {
        self.components
            .get(id)
            .expect("component handle is stale or foreign")
    }

    // Recompute cached world matrices for `start` and its subtree, firing
    // change events and relocating culled components. Subtrees whose world
    // matrix did not change are skipped entirely.
    fn propagate_world(&mut self, start: NodeId) {
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let parent_world = match self.nodes[id].parent {
                Some(parent) => self.nodes[parent].world,
                None => Mat4::identity(),
            };

            let old_world = self.nodes[id].world;
            let new_world = parent_world * self.nodes[id].local.to_matrix();

            if new_world == old_world {
                continue;
            }

            self.nodes[id].world = new_world;
            stack.extend(self.nodes[id].children.iter().copied());

            self.events.emit(&SceneEvent::TransformChanged {
                node: id,
                old_world,
                new_world,
            });

            let attached: Vec<ComponentId> = self.nodes[id].components.clone();
            for component in attached {
                let kind = &self.components[component].kind;
                let old_bounds = kind.world_bounds(&old_world);
                let new_bounds = kind.world_bounds(&new_world);

                // A world change does not imply a bound change: rotating a
                // node around a point light leaves its sphere where it was.
                if let (Some(old_bounds), Some(new_bounds)) = (old_bounds, new_bounds) {
                    if old_bounds != new_bounds {
                        self.hierarchy.update_volume(component, new_bounds);
                        self.events.emit(&SceneEvent::BoundsChanged {
                            component,
                            old_bounds,
                            new_bounds,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ListenerAction, SceneEventKind};
    use crate::foundation::math::{Quat, Vec3};
    use crate::scene::component::{CameraComponent, LightComponent, MeshComponent};
    use crate::scene::volume::{Aabb, Sphere};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn unit_cube() -> MeshComponent {
        MeshComponent::new(Aabb::from_center_extents(
            Vec3::zeros(),
            Vec3::new(0.5, 0.5, 0.5),
        ))
    }

    fn probe_at(center: Vec3) -> QueryVolume {
        QueryVolume::Aabb(Aabb::from_center_extents(center, Vec3::new(1.0, 1.0, 1.0)))
    }

    #[test]
    fn test_mesh_is_queryable_where_its_node_sits() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        scene.set_local_transform(node, Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));
        let mesh = scene.add_component(node, unit_cube());

        assert_eq!(scene.intersections(&probe_at(Vec3::new(5.0, 0.0, 0.0))), vec![mesh]);
        assert!(scene.intersections(&probe_at(Vec3::new(-5.0, 0.0, 0.0))).is_empty());
    }

    #[test]
    fn test_moving_a_node_moves_its_query_results() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let mesh = scene.add_component(node, unit_cube());

        assert_eq!(scene.intersections(&probe_at(Vec3::zeros())), vec![mesh]);

        scene.set_local_transform(node, Transform::from_position(Vec3::new(20.0, 0.0, 0.0)));

        assert!(scene.intersections(&probe_at(Vec3::zeros())).is_empty());
        assert_eq!(scene.intersections(&probe_at(Vec3::new(20.0, 0.0, 0.0))), vec![mesh]);
    }

    #[test]
    fn test_child_world_transform_composes_parent() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_child(parent);

        scene.set_local_transform(parent, Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        scene.set_local_transform(child, Transform::from_position(Vec3::new(0.0, 5.0, 0.0)));

        let world = scene.world_transform(child);
        assert_relative_eq!(world[(0, 3)], 10.0, epsilon = 1e-6);
        assert_relative_eq!(world[(1, 3)], 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_moving_parent_relocates_child_components() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_child(parent);
        let mesh = scene.add_component(child, unit_cube());

        scene.set_local_transform(parent, Transform::from_position(Vec3::new(30.0, 0.0, 0.0)));

        assert!(scene.intersections(&probe_at(Vec3::zeros())).is_empty());
        assert_eq!(scene.intersections(&probe_at(Vec3::new(30.0, 0.0, 0.0))), vec![mesh]);
    }

    #[test]
    fn test_destroyed_node_leaves_no_query_results() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        scene.add_component(node, unit_cube());
        scene.add_component(node, LightComponent::point(3.0));

        assert_eq!(scene.culled_component_count(), 2);

        scene.destroy_node(node);

        assert_eq!(scene.culled_component_count(), 0);
        assert!(scene.intersections(&probe_at(Vec3::zeros())).is_empty());
    }

    #[test]
    fn test_destroy_reparents_children_to_grandparent() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_child(parent);

        scene.set_local_transform(parent, Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        scene.set_local_transform(child, Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));

        scene.destroy_node(parent);

        // Child hangs off the root now; local transform kept, world recomputed.
        assert_eq!(scene.parent(child), Some(scene.root()));
        assert_relative_eq!(scene.local_transform(child).position.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(scene.world_transform(child)[(0, 3)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_disposal_events_fire_before_teardown() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let mesh = scene.add_component(node, unit_cube());

        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_disposed = Rc::clone(&seen);
        scene.events_mut().subscribe(SceneEventKind::NodeDisposed, move |event| {
            if let SceneEvent::NodeDisposed { node } = event {
                seen_disposed.borrow_mut().push(format!("disposed {node:?}"));
            }
            ListenerAction::Keep
        });

        let seen_removed = Rc::clone(&seen);
        scene
            .events_mut()
            .subscribe(SceneEventKind::ComponentRemoved, move |event| {
                if let SceneEvent::ComponentRemoved { component, .. } = event {
                    seen_removed.borrow_mut().push(format!("removed {component:?}"));
                }
                ListenerAction::Keep
            });

        scene.destroy_node(node);

        let log = seen.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], format!("disposed {node:?}"));
        assert_eq!(log[1], format!("removed {mesh:?}"));
    }

    #[test]
    fn test_transform_and_bounds_events_carry_old_and_new_state() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        scene.add_component(node, unit_cube());

        let moves = Rc::new(RefCell::new(Vec::new()));
        let bounds_moves = Rc::new(RefCell::new(Vec::new()));

        let moves_tap = Rc::clone(&moves);
        scene
            .events_mut()
            .subscribe(SceneEventKind::TransformChanged, move |event| {
                if let SceneEvent::TransformChanged { old_world, new_world, .. } = event {
                    moves_tap.borrow_mut().push((old_world[(0, 3)], new_world[(0, 3)]));
                }
                ListenerAction::Keep
            });

        let bounds_tap = Rc::clone(&bounds_moves);
        scene
            .events_mut()
            .subscribe(SceneEventKind::BoundsChanged, move |event| {
                if let SceneEvent::BoundsChanged { old_bounds, new_bounds, .. } = event {
                    bounds_tap
                        .borrow_mut()
                        .push((old_bounds.enclosing_aabb().center().x, new_bounds.enclosing_aabb().center().x));
                }
                ListenerAction::Keep
            });

        scene.set_local_transform(node, Transform::from_position(Vec3::new(7.0, 0.0, 0.0)));

        assert_eq!(*moves.borrow(), vec![(0.0, 7.0)]);
        assert_eq!(bounds_moves.borrow().len(), 1);
        let (old_x, new_x) = bounds_moves.borrow()[0];
        assert_relative_eq!(old_x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(new_x, 7.0, epsilon = 1e-6);
    }

    #[test]
    fn test_components_of_preserves_multiplicity_and_order() {
        let mut scene = Scene::new();
        let node = scene.create_node();

        let first = scene.add_component(node, LightComponent::point(1.0));
        let _camera = scene.add_component(node, CameraComponent::default());
        let second = scene.add_component(node, LightComponent::point(2.0));

        let lights: Vec<ComponentId> = scene
            .components_of::<LightComponent>(node)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(lights, vec![first, second]);

        let cameras: Vec<ComponentId> = scene
            .components_of::<CameraComponent>(node)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(cameras.len(), 1);
    }

    #[test]
    fn test_camera_and_directional_light_are_not_culled() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        scene.add_component(node, CameraComponent::default());
        scene.add_component(node, LightComponent::directional());

        assert_eq!(scene.culled_component_count(), 0);
    }

    #[test]
    fn test_remove_component_fires_event_then_unregisters() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let mesh = scene.add_component(node, unit_cube());

        let still_queryable = Rc::new(RefCell::new(false));
        let tap = Rc::clone(&still_queryable);
        scene
            .events_mut()
            .subscribe(SceneEventKind::ComponentRemoved, move |_| {
                *tap.borrow_mut() = true;
                ListenerAction::Keep
            });

        scene.remove_component(mesh);

        assert!(*still_queryable.borrow());
        assert!(scene.intersections(&probe_at(Vec3::zeros())).is_empty());
        assert_eq!(scene.culled_component_count(), 0);
        assert!(scene.components_of::<MeshComponent>(node).next().is_none());
    }

    #[test]
    fn test_modify_component_relocates_bound() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let light = scene.add_component(node, LightComponent::point(1.0));

        let far_probe = QueryVolume::Sphere(Sphere::new(Vec3::new(8.0, 0.0, 0.0), 0.5));
        assert!(scene.intersections(&far_probe).is_empty());

        scene.modify_component::<LightComponent, _>(light, |light| {
            light.kind = crate::scene::component::LightKind::Point { radius: 10.0 };
        });

        assert_eq!(scene.intersections(&far_probe), vec![light]);
    }

    #[test]
    fn test_mesh_outside_index_domain_is_still_queryable() {
        // Default domain is ±512; a node parked well past it must still
        // answer queries.
        let mut scene = Scene::new();
        let node = scene.create_node();
        let mesh = scene.add_component(node, unit_cube());

        scene.set_local_transform(node, Transform::from_position(Vec3::new(2000.0, 0.0, 0.0)));

        assert_eq!(scene.intersections(&probe_at(Vec3::new(2000.0, 0.0, 0.0))), vec![mesh]);
        assert!(scene.intersections(&probe_at(Vec3::zeros())).is_empty());
    }

    #[test]
    fn test_bound_preserving_transform_fires_no_bounds_event() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        scene.add_component(node, LightComponent::point(1.0));

        let bounds_events = Rc::new(RefCell::new(0));
        let tap = Rc::clone(&bounds_events);
        scene
            .events_mut()
            .subscribe(SceneEventKind::BoundsChanged, move |_| {
                *tap.borrow_mut() += 1;
                ListenerAction::Keep
            });

        // Rotation about the light's own position leaves its sphere in place.
        scene.set_local_transform(
            node,
            Transform::from_position_rotation(
                Vec3::zeros(),
                Quat::from_euler_angles(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            ),
        );

        assert_eq!(*bounds_events.borrow(), 0);

        // An actual move still reports exactly one change.
        scene.set_local_transform(node, Transform::from_position(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(*bounds_events.borrow(), 1);
    }

    #[test]
    fn test_modify_component_can_change_culling_class() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let light = scene.add_component(node, LightComponent::point(1.0));
        assert_eq!(scene.culled_component_count(), 1);

        scene.modify_component::<LightComponent, _>(light, |light| {
            light.kind = crate::scene::component::LightKind::Directional;
        });
        assert_eq!(scene.culled_component_count(), 0);

        // Teardown must not try to unregister the now-unculled light.
        scene.destroy_node(node);
    }

    #[test]
    fn test_rotation_grows_world_bounds() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        let mesh = scene.add_component(node, unit_cube());

        scene.set_local_transform(
            node,
            Transform::from_position_rotation(
                Vec3::zeros(),
                Quat::from_euler_angles(0.0, std::f32::consts::FRAC_PI_4, 0.0),
            ),
        );

        // The rotated cube's AABB reaches past 0.5 on x.
        let corner_probe = QueryVolume::Aabb(Aabb::from_center_extents(
            Vec3::new(0.65, 0.0, 0.0),
            Vec3::new(0.01, 0.01, 0.01),
        ));
        assert_eq!(scene.intersections(&corner_probe), vec![mesh]);
    }

    #[test]
    #[should_panic(expected = "cannot destroy the scene root")]
    fn test_root_is_indestructible() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.destroy_node(root);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn test_reparenting_under_own_descendant_fails_fast() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_child(parent);
        scene.set_parent(parent, child);
    }

    #[test]
    #[should_panic(expected = "stale or foreign")]
    fn test_stale_node_handle_fails_fast() {
        let mut scene = Scene::new();
        let node = scene.create_node();
        scene.destroy_node(node);
        let _ = scene.world_transform(node);
    }

    #[test]
    fn test_set_parent_recomputes_world() {
        let mut scene = Scene::new();
        let anchor = scene.create_node();
        scene.set_local_transform(anchor, Transform::from_position(Vec3::new(100.0, 0.0, 0.0)));

        let node = scene.create_node();
        let mesh = scene.add_component(node, unit_cube());
        scene.set_parent(node, anchor);

        assert_eq!(scene.intersections(&probe_at(Vec3::new(100.0, 0.0, 0.0))), vec![mesh]);
        assert!(scene.intersections(&probe_at(Vec3::zeros())).is_empty());
    }
}
