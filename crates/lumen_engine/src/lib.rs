//! # Lumen Engine
//!
//! Scene-management core for a real-time 3D renderer.
//!
//! ## Features
//!
//! - **Scene Graph**: Node hierarchy with cached world transforms
//! - **Components**: Closed set of mesh, light, and camera components
//! - **Spatial Index**: Uniform subdivision tree for frustum, box, and
//!   sphere queries over component bounds
//! - **Events**: Typed change notifications fired before destructive
//!   operations tear state down
//! - **Object Arena**: Generational, reference-counted storage for shared
//!   engine objects
//!
//! ## Quick Start
//!
//! ```rust
//! use lumen_engine::prelude::*;
//!
//! let mut scene = Scene::new();
//! let node = scene.create_node();
//! scene.add_component(
//!     node,
//!     MeshComponent::new(Aabb::from_center_extents(
//!         Vec3::zeros(),
//!         Vec3::new(0.5, 0.5, 0.5),
//!     )),
//! );
//!
//! scene.set_local_transform(node, Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));
//!
//! let near = scene.intersections(&QueryVolume::Sphere(Sphere::new(
//!     Vec3::new(5.0, 0.0, 0.0),
//!     1.0,
//! )));
//! assert_eq!(near.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod core;

pub mod events;
pub mod foundation;
pub mod object;
pub mod scene;
pub mod spatial;

pub use crate::core::config::{Config, ConfigError, EngineConfig, SceneSettings};

/// Common imports for engine users
pub mod prelude {
    pub use crate::core::config::{Config, EngineConfig};
    pub use crate::events::{EventBus, ListenerAction, SceneEvent, SceneEventKind};
    pub use crate::foundation::math::{Mat4, Quat, Transform, Vec3};
    pub use crate::object::{ObjectArena, ObjectPtr, ObjectWeakPtr};
    pub use crate::scene::{
        Aabb, Bounds, CameraComponent, ComponentId, Frustum, LightComponent, LightKind,
        MeshComponent, NodeId, QueryVolume, Scene, Sphere,
    };
    pub use crate::spatial::{UniformTree, UniformTreeConfig, VolumeHierarchy};
}
