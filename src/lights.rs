//! Read-only projection from light-tagged entities to renderer-consumable
//! point light descriptors. Recomputed from scratch on every collection
//! change; never writes back into the entity model.

use crate::entity::{EntityId, LightParams, SceneEntity};
use glam::Vec3;

pub const LIGHT_SHADOW_BIAS: f32 = -0.0015;
pub const LIGHT_SHADOW_NORMAL_BIAS: f32 = 0.04;
pub const LIGHT_SHADOW_MAP_SIZE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDescriptor {
    pub entity: EntityId,
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
    pub cast_shadows: bool,
    pub shadow_bias: f32,
    pub shadow_normal_bias: f32,
    pub shadow_map_size: u32,
}

/// Legacy fallback: imported lamp meshes predate the typed light tag and
/// are recognised by name.
fn name_matches_lamp(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("lamp") || lower.contains("light")
}

pub fn derive_lights(objects: &[SceneEntity]) -> Vec<LightDescriptor> {
    objects
        .iter()
        .filter(|entity| entity.light.is_some() || name_matches_lamp(&entity.name))
        .map(|entity| {
            let params = entity.light.unwrap_or_default();
            let center = entity
                .world_aabb()
                .map(|aabb| aabb.center())
                .unwrap_or(entity.node.transform.position);
            LightDescriptor {
                entity: entity.id,
                position: center + params.offset,
                color: params.color,
                intensity: params.intensity,
                distance: params.distance,
                decay: params.decay,
                cast_shadows: true,
                shadow_bias: LIGHT_SHADOW_BIAS,
                shadow_normal_bias: LIGHT_SHADOW_NORMAL_BIAS,
                shadow_map_size: LIGHT_SHADOW_MAP_SIZE,
            }
        })
        .collect()
}
