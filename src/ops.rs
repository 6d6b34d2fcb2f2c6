//! Mutation operators: every edit intent maps to a pure function that takes
//! the current collection and returns a brand-new one. Inputs are never
//! mutated, which is what lets the history manager keep old collections
//! alive safely.

use crate::entity::{EntityId, LightParams, SceneEntity};
use crate::error::EditError;
use crate::material::{decode_texture, rgb_from_hex, rgba_from_hex, Material};
use crate::mesh::Mesh;
use crate::node::{SceneNode, TransformAxis, TransformField};
use glam::Vec3;
use rand::Rng;

pub const CUBE_COLOR: u32 = 0x8aaaff;
pub const SPHERE_COLOR: u32 = 0xff8aaf;
pub const LIGHT_COLOR: u32 = 0xfff2cc;

fn random_floor_position(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(rng.gen_range(-1.0..1.0), 0.5, rng.gen_range(-1.0..1.0))
}

/// Cube primitive: unit box resting on the floor at a randomized spot near
/// the room center.
pub fn create_cube() -> SceneEntity {
    let mut rng = rand::thread_rng();
    let mut node = SceneNode::with_mesh("Cube", Mesh::cube(1.0), Material::with_base_color(rgba_from_hex(CUBE_COLOR)));
    node.transform.position = random_floor_position(&mut rng);
    node.set_shadow_flags(true, true);
    SceneEntity::new("Cube", node)
}

pub fn create_sphere() -> SceneEntity {
    let mut rng = rand::thread_rng();
    let mut node = SceneNode::with_mesh(
        "Sphere",
        Mesh::sphere(0.5, 32, 32),
        Material::with_base_color(rgba_from_hex(SPHERE_COLOR)),
    );
    node.transform.position = random_floor_position(&mut rng);
    node.set_shadow_flags(true, true);
    SceneEntity::new("Sphere", node)
}

/// Logical light represented by an emissive bulb proxy. The proxy is visual
/// only (no shadows); the light data lives in [`LightParams`].
pub fn create_light() -> SceneEntity {
    let material = Material {
        label: "Bulb".to_string(),
        base_color: [1.0, 1.0, 1.0, 1.0],
        metallic: 0.0,
        roughness: 0.3,
        emissive: rgb_from_hex(0xffffee),
        base_color_map: None,
    };
    let mut node = SceneNode::with_mesh("Light", Mesh::sphere(0.2, 16, 16), material);
    node.transform.position = Vec3::new(0.0, 1.2, 0.0);

    let mut entity = SceneEntity::new("Light", node);
    // Freshly placed lights start brighter than the derivation fallback.
    entity.light = Some(LightParams { intensity: 3.0, ..LightParams::default() });
    entity
}

/// Remove the entity with the given id; absent or `None` ids leave the
/// collection unchanged.
pub fn delete_entity(objects: &[SceneEntity], id: Option<&EntityId>) -> Vec<SceneEntity> {
    match id {
        Some(id) => objects.iter().filter(|entity| entity.id != *id).cloned().collect(),
        None => objects.to_vec(),
    }
}

/// Update the user-facing name, keeping the payload root's label in sync.
pub fn rename_entity(objects: &[SceneEntity], id: &EntityId, name: &str) -> Vec<SceneEntity> {
    objects
        .iter()
        .map(|entity| {
            if entity.id != *id {
                return entity.clone();
            }
            let mut edited = entity.clone();
            edited.name = name.to_string();
            edited.node.name = name.to_string();
            edited
        })
        .collect()
}

/// Replace the base color on every surface of the entity. Materials are
/// cloned, never mutated, so imported siblings sharing a material keep
/// their appearance.
pub fn recolor_entity(objects: &[SceneEntity], id: &EntityId, color: [f32; 4]) -> Vec<SceneEntity> {
    objects
        .iter()
        .map(|entity| {
            if entity.id != *id {
                return entity.clone();
            }
            let mut edited = entity.clone();
            edited.node.edit_materials(&mut |material| material.base_color = color);
            edited
        })
        .collect()
}

/// Bind decoded image bytes as the diffuse map on every surface of the
/// entity, or clear the map when `bytes` is `None`. Dropping the previous
/// map's last reference releases the pixel data.
pub fn apply_texture(
    objects: &[SceneEntity],
    id: &EntityId,
    bytes: Option<&[u8]>,
) -> Result<Vec<SceneEntity>, EditError> {
    let map = match bytes {
        Some(bytes) => Some(decode_texture(bytes)?),
        None => None,
    };
    Ok(objects
        .iter()
        .map(|entity| {
            if entity.id != *id {
                return entity.clone();
            }
            let mut edited = entity.clone();
            edited.node.edit_materials(&mut |material| material.base_color_map = map.clone());
            edited
        })
        .collect())
}

/// Update only the light bag; a no-op for entities that are not
/// light-tagged.
pub fn set_light_intensity(objects: &[SceneEntity], id: &EntityId, intensity: f32) -> Vec<SceneEntity> {
    edit_light(objects, id, |params| params.intensity = intensity)
}

pub fn set_light_color(objects: &[SceneEntity], id: &EntityId, color: [f32; 3]) -> Vec<SceneEntity> {
    edit_light(objects, id, |params| params.color = color)
}

fn edit_light(objects: &[SceneEntity], id: &EntityId, f: impl Fn(&mut LightParams)) -> Vec<SceneEntity> {
    objects
        .iter()
        .map(|entity| {
            if entity.id != *id || entity.light.is_none() {
                return entity.clone();
            }
            let mut edited = entity.clone();
            if let Some(params) = &mut edited.light {
                f(params);
            }
            edited
        })
        .collect()
}

/// Produce the candidate collection for a single-axis transform edit. The
/// result is not yet committed: transform-class mutations pass through the
/// constraint engine first.
pub fn set_transform(
    objects: &[SceneEntity],
    id: &EntityId,
    field: TransformField,
    axis: TransformAxis,
    value: f32,
) -> Vec<SceneEntity> {
    objects
        .iter()
        .map(|entity| {
            if entity.id != *id {
                return entity.clone();
            }
            let mut edited = entity.clone();
            edited.node.transform.set_field(field, axis, value);
            edited
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_cube_spawns_inside_start_area() {
        for _ in 0..16 {
            let cube = create_cube();
            let pos = cube.node.transform.position;
            assert!(pos.x >= -1.0 && pos.x < 1.0);
            assert_eq!(pos.y, 0.5);
            assert!(pos.z >= -1.0 && pos.z < 1.0);
            assert!(cube.node.cast_shadows && cube.node.receive_shadows);
        }
    }

    #[test]
    fn light_proxy_casts_no_shadows() {
        let light = create_light();
        assert!(!light.node.cast_shadows);
        let params = light.light.unwrap();
        assert_eq!(params.intensity, 3.0);
        assert_eq!(params.color, rgb_from_hex(LIGHT_COLOR));
    }

    #[test]
    fn delete_without_id_is_identity() {
        let objects = vec![create_cube(), create_sphere()];
        let unchanged = delete_entity(&objects, None);
        assert_eq!(unchanged.len(), 2);
        let missing = EntityId::new();
        assert_eq!(delete_entity(&objects, Some(&missing)).len(), 2);
        let removed = delete_entity(&objects, Some(&objects[0].id));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, objects[1].id);
    }

    #[test]
    fn rename_updates_payload_label() {
        let objects = vec![create_cube()];
        let renamed = rename_entity(&objects, &objects[0].id, "Crate");
        assert_eq!(renamed[0].name, "Crate");
        assert_eq!(renamed[0].node.name, "Crate");
        assert_eq!(objects[0].name, "Cube");
    }

    #[test]
    fn recolor_leaves_input_collection_alone() {
        let objects = vec![create_cube()];
        let recolored = recolor_entity(&objects, &objects[0].id, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(recolored[0].node.material.as_ref().unwrap().base_color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(objects[0].node.material.as_ref().unwrap().base_color, rgba_from_hex(CUBE_COLOR));
    }

    #[test]
    fn texture_decode_failure_leaves_collection_unchanged() {
        let objects = vec![create_cube()];
        let err = apply_texture(&objects, &objects[0].id, Some(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, EditError::TextureDecode { .. }));
        assert!(objects[0].node.material.as_ref().unwrap().base_color_map.is_none());
    }

    #[test]
    fn light_edits_skip_untagged_entities() {
        let objects = vec![create_cube()];
        let unchanged = set_light_intensity(&objects, &objects[0].id, 9.0);
        assert!(unchanged[0].light.is_none());

        let lights = vec![create_light()];
        let edited = set_light_intensity(&lights, &lights[0].id, 9.0);
        assert_eq!(edited[0].light.unwrap().intensity, 9.0);
    }

    #[test]
    fn set_transform_touches_one_axis() {
        let objects = vec![create_cube()];
        let moved = set_transform(&objects, &objects[0].id, TransformField::Position, TransformAxis::X, 3.25);
        assert_eq!(moved[0].node.transform.position.x, 3.25);
        assert_eq!(moved[0].node.transform.position.y, objects[0].node.transform.position.y);
    }
}
