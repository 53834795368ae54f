//! Scene graph and component model
//!
//! The scene is a tree of nodes, each carrying a local transform and a set of
//! components from a closed kind set. It bridges gameplay code and the
//! renderer:
//! - Node hierarchy with cached world transforms, recomputed on change
//! - Components registered in a spatial hierarchy when they report a bound
//! - Change notifications over [`crate::events::EventBus`]
//!
//! ## Architecture
//!
//! ```text
//! Scene (nodes + components)
//!      ↓ world bounds
//! VolumeHierarchy (spatial index)
//!      ↓ intersections
//! Renderer / gameplay queries
//! ```

pub mod component;
pub mod volume;

mod scene_graph;

use slotmap::new_key_type;

pub use component::{
    CameraComponent, ComponentKind, ComponentVariant, LightComponent, LightKind, MeshComponent,
};
pub use scene_graph::Scene;
pub use volume::{Aabb, Bounds, Frustum, Intersection, Plane, QueryVolume, Sphere};

new_key_type! {
    /// Generational handle to a scene node.
    pub struct NodeId;

    /// Generational handle to a component instance.
    pub struct ComponentId;
}
