use crate::animation::AnimationClip;
use crate::bounds::Aabb;
use crate::material::rgb_from_hex;
use crate::node::SceneNode;
use glam::Vec3;
use std::fmt;
use uuid::Uuid;

/// Opaque entity identity: assigned at creation, immutable, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(Uuid);

impl EntityId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Logical light source data carried by a light-tagged entity.
///
/// The bulb proxy mesh is only a visual handle; these parameters are the
/// source of truth the light derivation reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub color: [f32; 3],
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
    pub offset: Vec3,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            color: rgb_from_hex(0xfff2cc),
            intensity: 2.0,
            distance: 10.0,
            decay: 2.0,
            offset: Vec3::new(0.0, 0.15, 0.0),
        }
    }
}

/// One placed scene element: identity, user-facing name, exclusively owned
/// renderable payload, optional light tag, and any animation clips attached
/// at import time.
#[derive(Debug, Clone)]
pub struct SceneEntity {
    pub id: EntityId,
    pub name: String,
    pub node: SceneNode,
    pub light: Option<LightParams>,
    pub animations: Vec<AnimationClip>,
}

impl SceneEntity {
    pub fn new(name: impl Into<String>, node: SceneNode) -> Self {
        Self { id: EntityId::new(), name: name.into(), node, light: None, animations: Vec::new() }
    }

    pub fn world_aabb(&self) -> Option<Aabb> {
        self.node.world_aabb()
    }
}

pub fn find_entity<'a>(objects: &'a [SceneEntity], id: &EntityId) -> Option<&'a SceneEntity> {
    objects.iter().find(|entity| entity.id == *id)
}

/// Id uniqueness is a collection invariant; checked on every commit in
/// debug builds.
pub fn debug_assert_unique_ids(objects: &[SceneEntity]) {
    if cfg!(debug_assertions) {
        let mut seen = std::collections::HashSet::with_capacity(objects.len());
        for entity in objects {
            assert!(seen.insert(entity.id), "duplicate entity id {}", entity.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_across_creations() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn light_defaults_match_derivation_table() {
        let params = LightParams::default();
        assert_eq!(params.color, rgb_from_hex(0xfff2cc));
        assert_eq!(params.intensity, 2.0);
        assert_eq!(params.distance, 10.0);
        assert_eq!(params.decay, 2.0);
        assert_eq!(params.offset, Vec3::new(0.0, 0.15, 0.0));
    }
}
