//! glTF import: parse an interchange payload into renderable payload trees,
//! ground them on the floor plane, and split top-level children into one
//! entity each. Sourced from a byte buffer, a local file, or a remote URL
//! with a progress side channel.

use crate::animation::{AnimationChannel, AnimationClip, AnimationInterpolation, ChannelValues};
use crate::entity::SceneEntity;
use crate::error::EditError;
use crate::material::{Material, TextureMap};
use crate::mesh::{compute_normals, Mesh, MeshVertex};
use crate::node::SceneNode;
use crate::remote;
use glam::{EulerRot, Quat, Vec2, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;
use std::path::Path;
use std::sync::Arc;

/// Parse an in-memory interchange payload (GLB or glTF JSON).
///
/// `source_name` labels entities when the payload's own nodes carry no
/// name, and identifies the input in failure reports.
pub fn import_from_slice(bytes: &[u8], source_name: &str) -> Result<Vec<SceneEntity>, EditError> {
    let (document, buffers, images) = gltf::import_slice(bytes)
        .map_err(|source| EditError::ImportParse { source_name: source_name.to_string(), source })?;
    Ok(build_entities(&document, &buffers, &images, source_name))
}

pub fn import_from_path(path: impl AsRef<Path>) -> Result<Vec<SceneEntity>, EditError> {
    let path = path.as_ref();
    let source_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("imported-model")
        .to_string();
    let (document, buffers, images) = gltf::import(path)
        .map_err(|source| EditError::ImportParse { source_name: source_name.clone(), source })?;
    Ok(build_entities(&document, &buffers, &images, &source_name))
}

/// Fetch and parse a remote payload, reporting received percentage through
/// `progress`. Network failures carry the url; parse failures the same.
pub fn import_from_url(url: &str, progress: impl FnMut(f32)) -> Result<Vec<SceneEntity>, EditError> {
    let bytes = remote::fetch_bytes(url, progress)?;
    import_from_slice(&bytes, "imported-model")
}

fn build_entities(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    fallback_name: &str,
) -> Vec<SceneEntity> {
    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        log::warn!("[import] '{fallback_name}' contains no scene, nothing to place");
        return Vec::new();
    };

    let materials = convert_materials(document, images);
    let clips = collect_clips(document, buffers);

    let gltf_children: Vec<gltf::Node> = scene.nodes().collect();
    let mut root = SceneNode::new(fallback_name);
    for gltf_node in &gltf_children {
        root.children.push(convert_node(gltf_node, buffers, &materials));
    }
    root.ground();

    let mut entities = Vec::new();
    for (child, gltf_node) in root.children.iter().zip(&gltf_children) {
        // Only meshes and groups become entities of their own, matching the
        // interactive editor's drop behavior; stray cameras/empties stay out.
        if child.mesh.is_none() && child.children.is_empty() {
            continue;
        }
        let mut node = child.clone();
        node.ground();
        node.set_shadow_flags(true, true);
        let name = match gltf_node.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fallback_name.to_string(),
        };
        let mut entity = SceneEntity::new(name, node);
        entity.animations = clips.clone();
        entities.push(entity);
    }

    if entities.is_empty() {
        root.set_shadow_flags(true, true);
        root.name = fallback_name.to_string();
        let mut entity = SceneEntity::new(fallback_name, root);
        entity.animations = clips;
        entities.push(entity);
    }

    entities
}

fn node_label(node: &gltf::Node) -> String {
    node.name().map(str::to_string).unwrap_or_else(|| format!("node_{}", node.index()))
}

fn convert_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    materials: &[Arc<Material>],
) -> SceneNode {
    let mut out = SceneNode::new(node_label(node));

    let (translation, rotation, scale) = node.transform().decomposed();
    let quat = Quat::from_xyzw(rotation[0], rotation[1], rotation[2], rotation[3]).normalize();
    let (rx, ry, rz) = quat.to_euler(EulerRot::XYZ);
    out.transform.position = Vec3::from_array(translation);
    out.transform.rotation = Vec3::new(rx, ry, rz);
    out.transform.scale = Vec3::from_array(scale);

    if let Some(gltf_mesh) = node.mesh() {
        let mut converted: Vec<(Mesh, Option<Arc<Material>>)> = Vec::new();
        for primitive in gltf_mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            if let Some(mesh) = convert_primitive(&primitive, buffers) {
                let material = primitive
                    .material()
                    .index()
                    .and_then(|index| materials.get(index).cloned())
                    .or_else(|| Some(Arc::new(Material::default())));
                converted.push((mesh, material));
            }
        }
        // One surface inlines; multi-material meshes fan out into children
        // so each keeps its own material.
        if converted.len() == 1 {
            let (mesh, material) = converted.pop().expect("one converted primitive");
            out.mesh = Some(mesh);
            out.material = material;
        } else {
            for (index, (mesh, material)) in converted.into_iter().enumerate() {
                let mut child = SceneNode::new(format!("{}_{index}", out.name));
                child.mesh = Some(mesh);
                child.material = material;
                out.children.push(child);
            }
        }
    }

    for child in node.children() {
        out.children.push(convert_node(&child, buffers, materials));
    }

    out
}

fn convert_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Option<Mesh> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from_array).collect();
    if positions.is_empty() {
        return None;
    }

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|read| read.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let mut normals: Vec<Vec3> = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from_array).collect())
        .unwrap_or_default();
    if normals.len() != positions.len() || normals.iter().all(|n| n.length_squared() == 0.0) {
        normals = compute_normals(&positions, &indices);
    }

    let mut tex_coords: Vec<Vec2> = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().map(Vec2::from_array).collect())
        .unwrap_or_default();
    if tex_coords.len() != positions.len() {
        tex_coords.resize(positions.len(), Vec2::ZERO);
    }

    let vertices: Vec<MeshVertex> = positions
        .iter()
        .enumerate()
        .map(|(i, pos)| MeshVertex::new(*pos, normals[i].normalize_or_zero(), tex_coords[i]))
        .collect();

    Some(Mesh::new(vertices, indices))
}

fn convert_materials(document: &gltf::Document, images: &[gltf::image::Data]) -> Vec<Arc<Material>> {
    let mut materials = Vec::new();
    for (index, material) in document.materials().enumerate() {
        let label = material.name().map(str::to_string).unwrap_or_else(|| format!("material_{index}"));
        let pbr = material.pbr_metallic_roughness();
        let base_color_map = pbr.base_color_texture().and_then(|info| {
            let image_index = info.texture().source().index();
            match images.get(image_index) {
                Some(data) => match convert_image_to_rgba(data) {
                    Ok(rgba) => Some(TextureMap {
                        width: data.width,
                        height: data.height,
                        rgba: Arc::from(rgba.into_boxed_slice()),
                    }),
                    Err(err) => {
                        log::warn!("[import] material '{label}': unusable base color image: {err}");
                        None
                    }
                },
                None => None,
            }
        });
        materials.push(Arc::new(Material {
            label,
            base_color: pbr.base_color_factor(),
            metallic: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
            emissive: material.emissive_factor(),
            base_color_map,
        }));
    }
    materials
}

fn convert_image_to_rgba(image: &gltf::image::Data) -> Result<Vec<u8>, String> {
    match image.format {
        gltf::image::Format::R8 => {
            let mut out = Vec::with_capacity(image.pixels.len() * 4);
            for &value in &image.pixels {
                out.extend_from_slice(&[value, value, value, 255]);
            }
            Ok(out)
        }
        gltf::image::Format::R8G8 => {
            let mut out = Vec::with_capacity(image.pixels.len() / 2 * 4);
            for chunk in image.pixels.chunks_exact(2) {
                out.extend_from_slice(&[chunk[0], chunk[1], 0, 255]);
            }
            Ok(out)
        }
        gltf::image::Format::R8G8B8 => {
            let mut out = Vec::with_capacity(image.pixels.len() / 3 * 4);
            for chunk in image.pixels.chunks_exact(3) {
                out.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
            }
            Ok(out)
        }
        gltf::image::Format::R8G8B8A8 => Ok(image.pixels.clone()),
        other => Err(format!("unsupported image format {other:?}")),
    }
}

fn collect_clips(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<AnimationClip> {
    let mut clips = Vec::new();
    for (anim_index, animation) in document.animations().enumerate() {
        let clip_name =
            animation.name().map(str::to_string).unwrap_or_else(|| format!("animation_{anim_index}"));
        let mut channels = Vec::new();
        for channel in animation.channels() {
            let target = node_label(&channel.target().node());
            let interpolation = match channel.sampler().interpolation() {
                Interpolation::Linear => AnimationInterpolation::Linear,
                Interpolation::Step => AnimationInterpolation::Step,
                Interpolation::CubicSpline => {
                    log::warn!(
                        "[import] animation '{clip_name}' uses CubicSpline interpolation; skipping channel targeting '{target}'."
                    );
                    continue;
                }
            };

            let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(inputs) = reader.read_inputs() else {
                continue;
            };
            let times: Vec<f32> = inputs.collect();
            if times.is_empty() {
                continue;
            }
            let Some(outputs) = reader.read_outputs() else {
                continue;
            };
            let values = match outputs {
                ReadOutputs::Translations(iter) => ChannelValues::Translation(iter.collect()),
                ReadOutputs::Rotations(rotations) => {
                    ChannelValues::Rotation(rotations.into_f32().collect())
                }
                ReadOutputs::Scales(iter) => ChannelValues::Scale(iter.collect()),
                ReadOutputs::MorphTargetWeights(_) => continue,
            };
            if values.len() != times.len() {
                log::warn!(
                    "[import] animation '{clip_name}' channel targeting '{target}' has {} keys for {} times; skipping.",
                    values.len(),
                    times.len()
                );
                continue;
            }
            channels.push(AnimationChannel { target, interpolation, times, values });
        }
        if !channels.is_empty() {
            clips.push(AnimationClip { name: clip_name, channels });
        }
    }
    clips
}
