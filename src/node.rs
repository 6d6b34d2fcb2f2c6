use crate::bounds::Aabb;
use crate::material::Material;
use crate::mesh::Mesh;
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::sync::Arc;

/// Which component of a transform an edit addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformField {
    Position,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformAxis {
    X,
    Y,
    Z,
}

/// Local TRS transform. Rotation is Euler XYZ in radians — the editing
/// surface exposes per-axis fields, so the euler form is canonical and
/// quaternions only appear at the interchange boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Vec3::ZERO, scale: Vec3::ONE }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }

    pub fn set_field(&mut self, field: TransformField, axis: TransformAxis, value: f32) {
        let target = match field {
            TransformField::Position => &mut self.position,
            TransformField::Rotation => &mut self.rotation,
            TransformField::Scale => &mut self.scale,
        };
        match axis {
            TransformAxis::X => target.x = value,
            TransformAxis::Y => target.y = value,
            TransformAxis::Z => target.z = value,
        }
    }
}

/// One node of an entity's renderable payload tree.
///
/// The payload is exclusively owned by its entity. Mesh data is cloned with
/// the node; materials sit behind `Arc` with a replace-never-mutate
/// discipline, which makes `Clone` produce structurally independent
/// snapshots for the history manager.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub material: Option<Arc<Material>>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            mesh: None,
            material: None,
            cast_shadows: false,
            receive_shadows: false,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(name: impl Into<String>, mesh: Mesh, material: Material) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            mesh: Some(mesh),
            material: Some(Arc::new(material)),
            cast_shadows: false,
            receive_shadows: false,
            children: Vec::new(),
        }
    }

    /// Pre-order visit of this node and every descendant.
    pub fn visit(&self, f: &mut impl FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// Replace the material on every mesh-bearing descendant through a
    /// clone-and-swap, leaving any shared originals untouched.
    pub fn edit_materials(&mut self, f: &mut impl FnMut(&mut Material)) {
        self.visit_mut(&mut |node| {
            if let Some(material) = &node.material {
                let mut edited = (**material).clone();
                f(&mut edited);
                node.material = Some(Arc::new(edited));
            }
        });
    }

    pub fn set_shadow_flags(&mut self, cast: bool, receive: bool) {
        self.visit_mut(&mut |node| {
            if node.mesh.is_some() {
                node.cast_shadows = cast;
                node.receive_shadows = receive;
            }
        });
    }

    /// World-space AABB of the whole subtree, `None` when no descendant
    /// carries geometry.
    pub fn world_aabb(&self) -> Option<Aabb> {
        let mut acc = None;
        self.accumulate_aabb(Mat4::IDENTITY, &mut acc);
        acc
    }

    fn accumulate_aabb(&self, parent: Mat4, acc: &mut Option<Aabb>) {
        let world = parent * self.transform.matrix();
        if let Some(mesh) = &self.mesh {
            if !mesh.vertices.is_empty() {
                for corner in mesh.bounds.corners() {
                    let point = world.transform_point3(corner);
                    match acc {
                        Some(aabb) => aabb.expand_point(point),
                        None => *acc = Some(Aabb::from_point(point)),
                    }
                }
            }
        }
        for child in &self.children {
            child.accumulate_aabb(world, acc);
        }
    }

    /// Drop the subtree so its lowest point touches the floor plane.
    pub fn ground(&mut self) {
        if let Some(aabb) = self.world_aabb() {
            if aabb.min.y.is_finite() {
                self.transform.position.y -= aabb.min.y;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    fn cube_node(position: Vec3) -> SceneNode {
        let mut node = SceneNode::with_mesh("cube", Mesh::cube(1.0), Material::default());
        node.transform.position = position;
        node
    }

    #[test]
    fn world_aabb_follows_transform() {
        let node = cube_node(Vec3::new(2.0, 0.5, 0.0));
        let aabb = node.world_aabb().unwrap();
        assert!((aabb.min - Vec3::new(1.5, 0.0, -0.5)).length() < 1e-5);
        assert!((aabb.max - Vec3::new(2.5, 1.0, 0.5)).length() < 1e-5);
    }

    #[test]
    fn world_aabb_includes_children() {
        let mut parent = SceneNode::new("group");
        parent.children.push(cube_node(Vec3::new(-1.0, 0.0, 0.0)));
        parent.children.push(cube_node(Vec3::new(1.0, 0.0, 0.0)));
        let aabb = parent.world_aabb().unwrap();
        assert!((aabb.min.x - -1.5).abs() < 1e-5);
        assert!((aabb.max.x - 1.5).abs() < 1e-5);
    }

    #[test]
    fn grounding_rests_lowest_point_on_floor() {
        let mut node = cube_node(Vec3::new(0.0, 3.0, 0.0));
        node.ground();
        let aabb = node.world_aabb().unwrap();
        assert!(aabb.min.y.abs() < 1e-5);
    }

    #[test]
    fn material_edit_does_not_leak_into_shared_clone() {
        let mut a = cube_node(Vec3::ZERO);
        let b = a.clone();
        a.edit_materials(&mut |mat| mat.base_color = [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(b.material.as_ref().unwrap().base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(a.material.as_ref().unwrap().base_color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn empty_node_has_no_aabb() {
        assert!(SceneNode::new("empty").world_aabb().is_none());
    }
}
