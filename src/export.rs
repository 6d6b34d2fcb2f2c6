//! glTF export: clone the live entities into a transient document and
//! serialize through the interchange schema types, either as a binary GLB
//! container (the save/export default) or as JSON text with an embedded
//! data-URI buffer so both variants stay single-file. Export never mutates
//! or retains references into the live collection.

use crate::animation::{AnimationClip, AnimationInterpolation, ChannelValues};
use crate::entity::SceneEntity;
use crate::error::EditError;
use crate::material::{Material, TextureMap};
use crate::node::SceneNode;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use gltf::json;
use gltf::json::validation::{Checked, USize64};
use image::ImageEncoder;
use serde_json::json as json_value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

pub fn export_glb(entities: &[SceneEntity]) -> Result<Vec<u8>, EditError> {
    export_to_bytes(entities, true)
}

pub fn export_gltf_json(entities: &[SceneEntity]) -> Result<Vec<u8>, EditError> {
    export_to_bytes(entities, false)
}

pub fn export_to_bytes(entities: &[SceneEntity], binary: bool) -> Result<Vec<u8>, EditError> {
    let mut ctx = ExportContext::new();

    let mut roots = Vec::new();
    for entity in entities {
        roots.push(ctx.emit_node(&entity.node)?);
    }
    ctx.root.scenes.push(json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        nodes: roots,
    });
    ctx.root.scene = Some(json::Index::new(0));

    for entity in entities {
        for clip in &entity.animations {
            ctx.emit_animation(clip);
        }
    }

    ctx.finish(binary)
}

struct ExportContext {
    root: json::Root,
    chunk: Vec<u8>,
    material_indices: HashMap<usize, json::Index<json::Material>>,
    node_names: HashMap<String, u32>,
}

impl ExportContext {
    fn new() -> Self {
        let root = json::Root {
            asset: json::Asset { generator: Some("roomforge".to_string()), ..Default::default() },
            ..Default::default()
        };
        Self { root, chunk: Vec::new(), material_indices: HashMap::new(), node_names: HashMap::new() }
    }

    fn push_view(
        &mut self,
        bytes: &[u8],
        target: Option<json::buffer::Target>,
    ) -> json::Index<json::buffer::View> {
        while self.chunk.len() % 4 != 0 {
            self.chunk.push(0);
        }
        let offset = self.chunk.len();
        self.chunk.extend_from_slice(bytes);
        let index = self.root.buffer_views.len() as u32;
        self.root.buffer_views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: USize64(bytes.len() as u64),
            byte_offset: Some(USize64(offset as u64)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: target.map(Checked::Valid),
        });
        json::Index::new(index)
    }

    fn push_accessor(
        &mut self,
        view: json::Index<json::buffer::View>,
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        min: Option<serde_json::Value>,
        max: Option<serde_json::Value>,
    ) -> json::Index<json::Accessor> {
        let index = self.root.accessors.len() as u32;
        self.root.accessors.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: Some(USize64(0)),
            count: USize64(count as u64),
            component_type: Checked::Valid(json::accessor::GenericComponentType(component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Checked::Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        json::Index::new(index)
    }

    fn push_vec3_attribute(
        &mut self,
        values: &[[f32; 3]],
        with_bounds: bool,
        target: Option<json::buffer::Target>,
    ) -> json::Index<json::Accessor> {
        let bytes: Vec<u8> = values.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, target);
        let (min, max) = if with_bounds {
            let mut min = [f32::INFINITY; 3];
            let mut max = [f32::NEG_INFINITY; 3];
            for value in values {
                for axis in 0..3 {
                    min[axis] = min[axis].min(value[axis]);
                    max[axis] = max[axis].max(value[axis]);
                }
            }
            (
                Some(json_value!([min[0], min[1], min[2]])),
                Some(json_value!([max[0], max[1], max[2]])),
            )
        } else {
            (None, None)
        };
        self.push_accessor(
            view,
            values.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            min,
            max,
        )
    }

    fn push_vec2_attribute(&mut self, values: &[[f32; 2]]) -> json::Index<json::Accessor> {
        let bytes: Vec<u8> = values.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, Some(json::buffer::Target::ArrayBuffer));
        self.push_accessor(
            view,
            values.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec2,
            None,
            None,
        )
    }

    fn push_vec4_values(&mut self, values: &[[f32; 4]]) -> json::Index<json::Accessor> {
        let bytes: Vec<u8> = values.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, None);
        self.push_accessor(
            view,
            values.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec4,
            None,
            None,
        )
    }

    fn push_indices(&mut self, indices: &[u32]) -> json::Index<json::Accessor> {
        let bytes: Vec<u8> = indices.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, Some(json::buffer::Target::ElementArrayBuffer));
        self.push_accessor(
            view,
            indices.len(),
            json::accessor::ComponentType::U32,
            json::accessor::Type::Scalar,
            None,
            None,
        )
    }

    /// Keyframe input accessor; the schema requires min/max on sampler
    /// inputs.
    fn push_times(&mut self, times: &[f32]) -> json::Index<json::Accessor> {
        let bytes: Vec<u8> = times.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, None);
        let min = times.iter().copied().fold(f32::INFINITY, f32::min);
        let max = times.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        self.push_accessor(
            view,
            times.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Scalar,
            Some(json_value!([min])),
            Some(json_value!([max])),
        )
    }

    fn material_index(&mut self, material: &std::sync::Arc<Material>) -> Result<json::Index<json::Material>, EditError> {
        let key = std::sync::Arc::as_ptr(material) as usize;
        if let Some(index) = self.material_indices.get(&key) {
            return Ok(*index);
        }

        let base_color_texture = match &material.base_color_map {
            Some(map) => Some(self.emit_texture(map)?),
            None => None,
        };
        let index = json::Index::new(self.root.materials.len() as u32);
        self.root.materials.push(json::Material {
            name: Some(material.label.clone()),
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor(material.base_color),
                base_color_texture,
                metallic_factor: json::material::StrengthFactor(material.metallic),
                roughness_factor: json::material::StrengthFactor(material.roughness),
                ..Default::default()
            },
            emissive_factor: json::material::EmissiveFactor(material.emissive),
            ..Default::default()
        });
        self.material_indices.insert(key, index);
        Ok(index)
    }

    fn emit_texture(&mut self, map: &TextureMap) -> Result<json::texture::Info, EditError> {
        let png = encode_png(map)?;
        let view = self.push_view(&png, None);
        let image_index = json::Index::new(self.root.images.len() as u32);
        self.root.images.push(json::Image {
            buffer_view: Some(view),
            mime_type: Some(json::image::MimeType("image/png".to_string())),
            name: None,
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        let texture_index = json::Index::new(self.root.textures.len() as u32);
        self.root.textures.push(json::Texture {
            name: None,
            sampler: None,
            source: image_index,
            extensions: Default::default(),
            extras: Default::default(),
        });
        Ok(json::texture::Info {
            index: texture_index,
            tex_coord: 0,
            extensions: Default::default(),
            extras: Default::default(),
        })
    }

    fn emit_node(&mut self, node: &SceneNode) -> Result<json::Index<json::Node>, EditError> {
        let mesh = match (&node.mesh, &node.material) {
            (Some(mesh), material) => {
                let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();
                let normals: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.normal).collect();
                let uvs: Vec<[f32; 2]> = mesh.vertices.iter().map(|v| v.uv).collect();

                let position_accessor =
                    self.push_vec3_attribute(&positions, true, Some(json::buffer::Target::ArrayBuffer));
                let normal_accessor =
                    self.push_vec3_attribute(&normals, false, Some(json::buffer::Target::ArrayBuffer));
                let uv_accessor = self.push_vec2_attribute(&uvs);
                let index_accessor = self.push_indices(&mesh.indices);

                let mut attributes = BTreeMap::new();
                attributes.insert(Checked::Valid(json::mesh::Semantic::Positions), position_accessor);
                attributes.insert(Checked::Valid(json::mesh::Semantic::Normals), normal_accessor);
                attributes.insert(Checked::Valid(json::mesh::Semantic::TexCoords(0)), uv_accessor);

                let material_index = match material {
                    Some(material) => Some(self.material_index(material)?),
                    None => None,
                };

                let mesh_index = json::Index::new(self.root.meshes.len() as u32);
                self.root.meshes.push(json::Mesh {
                    extensions: Default::default(),
                    extras: Default::default(),
                    name: Some(node.name.clone()),
                    primitives: vec![json::mesh::Primitive {
                        attributes,
                        extensions: Default::default(),
                        extras: Default::default(),
                        indices: Some(index_accessor),
                        material: material_index,
                        mode: Checked::Valid(json::mesh::Mode::Triangles),
                        targets: None,
                    }],
                    weights: None,
                });
                Some(mesh_index)
            }
            _ => None,
        };

        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            children.push(self.emit_node(child)?);
        }

        let rotation = node.transform.rotation_quat().normalize();
        let index = self.root.nodes.len() as u32;
        self.root.nodes.push(json::Node {
            camera: None,
            children: if children.is_empty() { None } else { Some(children) },
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh,
            name: Some(node.name.clone()),
            rotation: Some(json::scene::UnitQuaternion(rotation.to_array())),
            scale: Some(node.transform.scale.to_array()),
            translation: Some(node.transform.position.to_array()),
            skin: None,
            weights: None,
        });
        self.node_names.entry(node.name.clone()).or_insert(index);
        Ok(json::Index::new(index))
    }

    fn emit_animation(&mut self, clip: &AnimationClip) {
        let mut samplers = Vec::new();
        let mut channels = Vec::new();
        for channel in &clip.channels {
            let Some(&node_index) = self.node_names.get(&channel.target) else {
                log::warn!(
                    "[export] animation '{}' targets missing node '{}'; dropping channel.",
                    clip.name,
                    channel.target
                );
                continue;
            };
            let input = self.push_times(&channel.times);
            let (output, path) = match &channel.values {
                ChannelValues::Translation(values) => (
                    self.push_vec3_attribute(values, false, None),
                    json::animation::Property::Translation,
                ),
                ChannelValues::Rotation(values) => {
                    (self.push_vec4_values(values), json::animation::Property::Rotation)
                }
                ChannelValues::Scale(values) => (
                    self.push_vec3_attribute(values, false, None),
                    json::animation::Property::Scale,
                ),
            };
            let interpolation = match channel.interpolation {
                AnimationInterpolation::Linear => json::animation::Interpolation::Linear,
                AnimationInterpolation::Step => json::animation::Interpolation::Step,
            };
            let sampler_index = json::Index::new(samplers.len() as u32);
            samplers.push(json::animation::Sampler {
                extensions: Default::default(),
                extras: Default::default(),
                input,
                interpolation: Checked::Valid(interpolation),
                output,
            });
            channels.push(json::animation::Channel {
                sampler: sampler_index,
                target: json::animation::Target {
                    extensions: Default::default(),
                    extras: Default::default(),
                    node: json::Index::new(node_index),
                    path: Checked::Valid(path),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }
        if channels.is_empty() {
            return;
        }
        self.root.animations.push(json::Animation {
            extensions: Default::default(),
            extras: Default::default(),
            channels,
            name: Some(clip.name.clone()),
            samplers,
        });
    }

    fn finish(mut self, binary: bool) -> Result<Vec<u8>, EditError> {
        if !self.chunk.is_empty() {
            let uri = if binary {
                None
            } else {
                Some(format!("data:application/octet-stream;base64,{}", BASE64.encode(&self.chunk)))
            };
            self.root.buffers.push(json::Buffer {
                byte_length: USize64(self.chunk.len() as u64),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri,
            });
        }

        if binary {
            let json_string = json::serialize::to_string(&self.root)
                .map_err(|err| EditError::export(format!("schema serialization: {err}")))?;
            let mut json_bytes = json_string.into_bytes();
            while json_bytes.len() % 4 != 0 {
                json_bytes.push(b' ');
            }
            let mut bin = self.chunk;
            while bin.len() % 4 != 0 {
                bin.push(0);
            }
            let mut length = 12 + 8 + json_bytes.len();
            let bin_chunk = if bin.is_empty() {
                None
            } else {
                length += 8 + bin.len();
                Some(Cow::Owned(bin))
            };
            let glb = gltf::binary::Glb {
                header: gltf::binary::Header {
                    magic: *b"glTF",
                    version: 2,
                    length: u32::try_from(length)
                        .map_err(|_| EditError::export("scene exceeds binary container limit"))?,
                },
                json: Cow::Owned(json_bytes),
                bin: bin_chunk,
            };
            let mut out = Vec::with_capacity(length);
            glb.to_writer(&mut out)
                .map_err(|err| EditError::export(format!("binary container: {err}")))?;
            Ok(out)
        } else {
            json::serialize::to_string_pretty(&self.root)
                .map(String::into_bytes)
                .map_err(|err| EditError::export(format!("schema serialization: {err}")))
        }
    }
}

fn encode_png(map: &TextureMap) -> Result<Vec<u8>, EditError> {
    let mut bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut bytes)
        .write_image(&map.rgba, map.width, map.height, image::ExtendedColorType::Rgba8)
        .map_err(|err| EditError::export(format!("texture encode: {err}")))?;
    Ok(bytes)
}
