//! Scene component kinds
//!
//! Components are a closed set of tagged variants rather than an open class
//! hierarchy: the scene stores [`ComponentKind`] values and dispatches on
//! capability. The one capability the spatial index cares about is
//! [`ComponentKind::world_bounds`] — components reporting a bound are
//! registered for culling, the rest are not.

use crate::foundation::math::{Mat4, Vec3};
use crate::scene::volume::{Aabb, Bounds, Frustum, Sphere};

/// A renderable mesh attached to a node.
///
/// The geometry itself is a renderer-side resource; the scene only tracks
/// its object-space bounds and visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshComponent {
    /// Object-space bounds of the referenced geometry
    pub local_bounds: Aabb,
    /// Whether the mesh participates in rendering
    pub visible: bool,
}

impl MeshComponent {
    /// Create a visible mesh component with the given object-space bounds
    pub fn new(local_bounds: Aabb) -> Self {
        Self {
            local_bounds,
            visible: true,
        }
    }
}

/// The shape of a light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Omnidirectional light with a finite influence radius
    Point {
        /// Influence radius in object space
        radius: f32,
    },
    /// Infinitely-distant light; affects the whole scene
    Directional,
    /// Cone light
    Spot {
        /// Maximum reach of the cone along its axis
        range: f32,
        /// Full cone angle in radians
        angle: f32,
    },
}

/// A light source attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct LightComponent {
    /// Light color (linear RGB)
    pub color: Vec3,
    /// Scalar intensity multiplier
    pub intensity: f32,
    /// Light shape
    pub kind: LightKind,
}

impl LightComponent {
    /// Create a white point light with the given radius
    pub fn point(radius: f32) -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            kind: LightKind::Point { radius },
        }
    }

    /// Create a white directional light
    pub fn directional() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            kind: LightKind::Directional,
        }
    }

    /// Create a white spot light with the given range and cone angle
    pub fn spot(range: f32, angle: f32) -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            kind: LightKind::Spot { range, angle },
        }
    }
}

/// A perspective camera attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Viewport aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_3,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraComponent {
    /// Projection matrix for this camera
    pub fn projection_matrix(&self) -> Mat4 {
        nalgebra::Perspective3::new(self.aspect, self.fov_y, self.near, self.far).to_homogeneous()
    }

    /// World-space culling frustum, given the owning node's world matrix.
    ///
    /// Returns `None` when the world matrix is singular (degenerate scale).
    pub fn world_frustum(&self, world: &Mat4) -> Option<Frustum> {
        let view = world.try_inverse()?;
        Some(Frustum::from_matrix(&(self.projection_matrix() * view)))
    }
}

/// Closed set of component kinds a node may carry.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    /// Renderable geometry
    Mesh(MeshComponent),
    /// Light source
    Light(LightComponent),
    /// Camera
    Camera(CameraComponent),
}

impl ComponentKind {
    /// Short name for log output
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Mesh(_) => "mesh",
            ComponentKind::Light(_) => "light",
            ComponentKind::Camera(_) => "camera",
        }
    }

    /// World-space bound this component contributes to the spatial index.
    ///
    /// `None` means the component is not culled: cameras, and directional
    /// lights which affect everything regardless of position.
    pub fn world_bounds(&self, world: &Mat4) -> Option<Bounds> {
        match self {
            ComponentKind::Mesh(mesh) => Some(Bounds::Aabb(mesh.local_bounds.transformed(world))),
            ComponentKind::Light(light) => match light.kind {
                LightKind::Point { radius } => Some(Bounds::Sphere(Sphere::new(
                    world_translation(world),
                    radius * max_axis_scale(world),
                ))),
                // A cone of the given range fits inside the sphere of the
                // same radius centered at the apex.
                LightKind::Spot { range, .. } => Some(Bounds::Sphere(Sphere::new(
                    world_translation(world),
                    range * max_axis_scale(world),
                ))),
                LightKind::Directional => None,
            },
            ComponentKind::Camera(_) => None,
        }
    }
}

fn world_translation(world: &Mat4) -> Vec3 {
    Vec3::new(world[(0, 3)], world[(1, 3)], world[(2, 3)])
}

fn max_axis_scale(world: &Mat4) -> f32 {
    let x = Vec3::new(world[(0, 0)], world[(1, 0)], world[(2, 0)]).magnitude();
    let y = Vec3::new(world[(0, 1)], world[(1, 1)], world[(2, 1)]).magnitude();
    let z = Vec3::new(world[(0, 2)], world[(1, 2)], world[(2, 2)]).magnitude();
    x.max(y).max(z)
}

/// Conversion between a concrete component type and [`ComponentKind`].
///
/// Gives the scene its typed `add_component` / `components_of` surface
/// without an open trait-object hierarchy.
pub trait ComponentVariant: Sized {
    /// Wrap this component into the closed kind set
    fn into_kind(self) -> ComponentKind;

    /// Borrow this component type out of a kind, if it matches
    fn from_kind(kind: &ComponentKind) -> Option<&Self>;

    /// Mutably borrow this component type out of a kind, if it matches
    fn from_kind_mut(kind: &mut ComponentKind) -> Option<&mut Self>;
}

macro_rules! impl_component_variant {
    ($type:ty, $variant:ident) => {
        impl ComponentVariant for $type {
            fn into_kind(self) -> ComponentKind {
                ComponentKind::$variant(self)
            }

            fn from_kind(kind: &ComponentKind) -> Option<&Self> {
                match kind {
                    ComponentKind::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_kind_mut(kind: &mut ComponentKind) -> Option<&mut Self> {
                match kind {
                    ComponentKind::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_component_variant!(MeshComponent, Mesh);
impl_component_variant!(LightComponent, Light);
impl_component_variant!(CameraComponent, Camera);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;

    #[test]
    fn test_mesh_world_bounds_follow_transform() {
        let mesh = ComponentKind::Mesh(MeshComponent::new(Aabb::new(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
        )));
        let world = Transform::from_position(Vec3::new(10.0, 10.0, 10.0)).to_matrix();

        let bounds = mesh.world_bounds(&world).expect("meshes are culled");
        match bounds {
            Bounds::Aabb(aabb) => {
                assert!((aabb.min.x - 10.0).abs() < 1e-6);
                assert!((aabb.max.x - 11.0).abs() < 1e-6);
            }
            Bounds::Sphere(_) => panic!("mesh bound must be an AABB"),
        }
    }

    #[test]
    fn test_point_light_radius_scales() {
        let light = ComponentKind::Light(LightComponent::point(2.0));
        let world = Transform::from_parts(
            Vec3::new(1.0, 0.0, 0.0),
            crate::foundation::math::Quat::identity(),
            Vec3::new(3.0, 1.0, 1.0),
        )
        .to_matrix();

        match light.world_bounds(&world) {
            Some(Bounds::Sphere(sphere)) => {
                assert!((sphere.center.x - 1.0).abs() < 1e-6);
                assert!((sphere.radius - 6.0).abs() < 1e-6);
            }
            other => panic!("expected sphere bound, got {other:?}"),
        }
    }

    #[test]
    fn test_directional_light_has_no_bound() {
        let light = ComponentKind::Light(LightComponent::directional());
        assert!(light.world_bounds(&Mat4::identity()).is_none());
    }

    #[test]
    fn test_variant_roundtrip() {
        let kind = MeshComponent::new(Aabb::point(Vec3::zeros())).into_kind();
        assert!(MeshComponent::from_kind(&kind).is_some());
        assert!(LightComponent::from_kind(&kind).is_none());
    }
}
