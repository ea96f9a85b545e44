use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use gltf::animation::util::ReadOutputs;
use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::assets::model::{ModelAsset, NodeDesc, SkinDesc};
use crate::errors::{Result, ViewerError};
use crate::resources::{Image, Material, Mesh, MeshVertex, Primitive};

/// Parses glTF (JSON with external or data-URI buffers) and GLB files into a
/// [`ModelAsset`].
///
/// External buffers and images are resolved relative to `base_path`. This
/// does blocking file I/O and decoding, so the asset loader runs it on a
/// blocking worker.
pub struct GltfLoader {
    base_path: PathBuf,
    images: Vec<Arc<Image>>,
    materials: Vec<Arc<Material>>,
    default_material: Arc<Material>,
}

impl GltfLoader {
    /// Entry point. `name` becomes the model's root node name.
    pub fn parse(bytes: &[u8], base_path: &Path, name: &str) -> Result<ModelAsset> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        let unsupported: Vec<_> = gltf.extensions_required().collect();
        if !unsupported.is_empty() {
            log::warn!("glTF requires unsupported extensions: {unsupported:?}");
        }

        let buffers = Self::load_buffers(&gltf, base_path)?;

        let mut loader = Self {
            base_path: base_path.to_path_buf(),
            images: Vec::new(),
            materials: Vec::new(),
            default_material: Arc::new(Material::default()),
        };

        loader.load_images(&gltf, &buffers)?;
        loader.load_materials(&gltf);

        let meshes = gltf
            .meshes()
            .map(|mesh| loader.load_mesh(&mesh, &buffers))
            .collect();

        let nodes = gltf.nodes().map(|node| Self::load_node(&node)).collect();
        let roots = Self::scene_roots(&gltf);
        let skins = Self::load_skins(&gltf, &buffers);
        let animations = Self::load_animations(&gltf, &buffers)?;

        Ok(ModelAsset {
            name: name.to_string(),
            nodes,
            roots,
            meshes,
            skins,
            animations,
        })
    }

    // --- Buffers & images ---

    fn load_buffers(gltf: &gltf::Gltf, base_path: &Path) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .clone()
                    .ok_or_else(|| ViewerError::Gltf("Missing GLB binary chunk".into()))?,
                gltf::buffer::Source::Uri(uri) => Self::read_uri(uri, base_path)?,
            };
            if data.len() < buffer.length() {
                return Err(ViewerError::Gltf(format!(
                    "Buffer {} is {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    /// Reads a `data:` URI inline or a relative file path.
    fn read_uri(uri: &str, base_path: &Path) -> Result<Vec<u8>> {
        if let Some(rest) = uri.strip_prefix("data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| ViewerError::DataUri(format!("missing ',' in {:.40}", uri)))?;
            if !header.ends_with(";base64") {
                return Err(ViewerError::DataUri(format!(
                    "only base64 data URIs are supported, got {header:?}"
                )));
            }
            return Ok(base64::engine::general_purpose::STANDARD.decode(payload)?);
        }

        let path = base_path.join(uri);
        std::fs::read(&path).map_err(|e| {
            log::error!("Failed to read {}: {e}", path.display());
            ViewerError::Io(e)
        })
    }

    fn load_images(&mut self, gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<()> {
        for image in gltf.images() {
            let label = image
                .name()
                .map_or_else(|| format!("Image_{}", image.index()), str::to_string);

            let decoded = match image.source() {
                gltf::image::Source::View { view, .. } => {
                    let buffer = buffers.get(view.buffer().index()).ok_or_else(|| {
                        ViewerError::AssetIndexOutOfBounds {
                            context: "image buffer".into(),
                            index: view.buffer().index(),
                        }
                    })?;
                    let start = view.offset();
                    let bytes = buffer.get(start..start + view.length()).ok_or_else(|| {
                        ViewerError::AssetIndexOutOfBounds {
                            context: "image buffer view".into(),
                            index: view.index(),
                        }
                    })?;
                    Image::decode(&label, bytes)?
                }
                gltf::image::Source::Uri { uri, .. } => {
                    let bytes = Self::read_uri(uri, &self.base_path)?;
                    Image::decode(&label, &bytes)?
                }
            };
            self.images.push(Arc::new(decoded));
        }
        Ok(())
    }

    fn load_materials(&mut self, gltf: &gltf::Gltf) {
        for material in gltf.materials() {
            let pbr = material.pbr_metallic_roughness();
            let mut engine_mat = Material::new(material.name().unwrap_or("Material"))
                .with_color(Vec4::from_array(pbr.base_color_factor()));
            engine_mat.double_sided = material.double_sided();

            if let Some(info) = pbr.base_color_texture() {
                let index = info.texture().source().index();
                match self.images.get(index) {
                    Some(image) => engine_mat.base_color_texture = Some(Arc::clone(image)),
                    None => log::warn!("Material references missing image {index}"),
                }
            }
            self.materials.push(Arc::new(engine_mat));
        }
    }

    // --- Geometry ---

    fn load_mesh(&self, mesh: &gltf::Mesh, buffers: &[Vec<u8>]) -> Arc<Mesh> {
        let name = mesh
            .name()
            .map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string);

        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!("{name}: skipping non-triangle primitive ({:?})", primitive.mode());
                continue;
            }
            if let Some(p) = self.load_primitive(&primitive, buffers) {
                primitives.push(p);
            } else {
                log::warn!("{name}: skipping primitive without positions");
            }
        }

        Arc::new(Mesh::new(&name, primitives))
    }

    fn load_primitive(&self, primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Option<Primitive> {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

        let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
        let count = positions.len();

        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map_or_else(|| vec![[0.0, 1.0, 0.0]; count], Iterator::collect);
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map_or_else(|| vec![[0.0, 0.0]; count], |t| t.into_f32().collect());

        let joints: Option<Vec<[u16; 4]>> = reader.read_joints(0).map(|j| j.into_u16().collect());
        let weights: Option<Vec<[f32; 4]>> =
            reader.read_weights(0).map(|w| w.into_f32().collect());
        let skinned = joints.is_some() && weights.is_some();

        let vertices = (0..count)
            .map(|i| {
                let mut v = MeshVertex::rigid(
                    positions[i],
                    normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                );
                if let (Some(j), Some(w)) = (&joints, &weights)
                    && let (Some(j), Some(w)) = (j.get(i), w.get(i))
                {
                    v.joints = j.map(u32::from);
                    v.weights = *w;
                }
                v
            })
            .collect();

        let indices = reader
            .read_indices()
            .map_or_else(|| (0..count as u32).collect(), |i| i.into_u32().collect());

        let material = primitive
            .material()
            .index()
            .and_then(|i| self.materials.get(i))
            .map_or_else(|| Arc::clone(&self.default_material), Arc::clone);

        Some(Primitive {
            vertices,
            indices,
            material,
            skinned,
        })
    }

    // --- Hierarchy ---

    fn node_name(node: &gltf::Node) -> String {
        node.name()
            .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
    }

    fn load_node(node: &gltf::Node) -> NodeDesc {
        let (t, r, s) = node.transform().decomposed();
        NodeDesc {
            name: Self::node_name(node),
            translation: Vec3::from_array(t),
            rotation: Quat::from_array(r),
            scale: Vec3::from_array(s),
            children: node.children().map(|c| c.index()).collect(),
            mesh: node.mesh().map(|m| m.index()),
            skin: node.skin().map(|s| s.index()),
        }
    }

    /// Nodes of the default scene, or of the first scene, or every node
    /// nobody lists as a child.
    fn scene_roots(gltf: &gltf::Gltf) -> Vec<usize> {
        if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
            return scene.nodes().map(|n| n.index()).collect();
        }

        let mut is_child = vec![false; gltf.nodes().len()];
        for node in gltf.nodes() {
            for child in node.children() {
                is_child[child.index()] = true;
            }
        }
        (0..is_child.len()).filter(|&i| !is_child[i]).collect()
    }

    fn load_skins(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<SkinDesc> {
        gltf.skins()
            .map(|skin| {
                let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let inverse_bind_matrices = reader
                    .read_inverse_bind_matrices()
                    .map(|iter| {
                        iter.map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                            .collect()
                    })
                    .unwrap_or_default();

                SkinDesc {
                    name: skin
                        .name()
                        .map_or_else(|| format!("Skin_{}", skin.index()), str::to_string),
                    joints: skin.joints().map(|j| j.index()).collect(),
                    inverse_bind_matrices,
                }
            })
            .collect()
    }

    // --- Animation ---

    fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<Arc<AnimationClip>>> {
        let mut animations = Vec::new();

        for anim in gltf.animations() {
            let mut tracks = Vec::new();

            for (channel_index, channel) in anim.channels().enumerate() {
                let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let target = channel.target();
                let node_name = Self::node_name(&target.node());

                let times: Vec<f32> = reader
                    .read_inputs()
                    .ok_or_else(|| {
                        ViewerError::Gltf(format!(
                            "Animation {}: channel without input times",
                            anim.index()
                        ))
                    })?
                    .collect();

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let Some(outputs) = reader.read_outputs() else {
                    log::warn!("Animation {}: channel without outputs", anim.index());
                    continue;
                };

                let key_count = times.len();
                let check = |value_count: usize| {
                    Self::check_output_count(
                        anim.index(),
                        channel_index,
                        key_count,
                        value_count,
                        interpolation,
                    )
                };

                let (target_path, data) = match outputs {
                    ReadOutputs::Translations(iter) => {
                        let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                        check(values.len())?;
                        (
                            TargetPath::Translation,
                            TrackData::Vector3(KeyframeTrack::new(times, values, interpolation)),
                        )
                    }
                    ReadOutputs::Rotations(iter) => {
                        let values: Vec<Quat> = iter.into_f32().map(Quat::from_array).collect();
                        check(values.len())?;
                        (
                            TargetPath::Rotation,
                            TrackData::Quaternion(KeyframeTrack::new(times, values, interpolation)),
                        )
                    }
                    ReadOutputs::Scales(iter) => {
                        let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                        check(values.len())?;
                        (
                            TargetPath::Scale,
                            TrackData::Vector3(KeyframeTrack::new(times, values, interpolation)),
                        )
                    }
                    ReadOutputs::MorphTargetWeights(_) => {
                        log::debug!("{node_name}: morph target weights not supported, skipped");
                        continue;
                    }
                };

                tracks.push(Track {
                    meta: TrackMeta {
                        node_name,
                        target: target_path,
                    },
                    data,
                });
            }

            let name = anim
                .name()
                .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);
            animations.push(Arc::new(AnimationClip::new(name, tracks)));
        }

        Ok(animations)
    }

    /// Output accessors must hold one value per keyframe, or three for
    /// cubic splines; sampling indexes by keyframe.
    fn check_output_count(
        animation: usize,
        channel: usize,
        key_count: usize,
        value_count: usize,
        interpolation: InterpolationMode,
    ) -> Result<()> {
        let expected = key_count * interpolation.values_per_keyframe();
        if value_count == expected {
            return Ok(());
        }
        Err(ViewerError::Gltf(format!(
            "Animation {animation} channel {channel}: {key_count} keyframes need {expected} output values, found {value_count}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_count_follows_interpolation() {
        assert!(GltfLoader::check_output_count(0, 0, 3, 3, InterpolationMode::Linear).is_ok());
        assert!(GltfLoader::check_output_count(0, 0, 3, 3, InterpolationMode::Step).is_ok());
        assert!(GltfLoader::check_output_count(0, 0, 3, 9, InterpolationMode::CubicSpline).is_ok());
        assert!(GltfLoader::check_output_count(0, 0, 0, 0, InterpolationMode::Linear).is_ok());
    }

    #[test]
    fn short_outputs_name_the_channel() {
        let err = GltfLoader::check_output_count(2, 1, 3, 1, InterpolationMode::Linear).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Animation 2 channel 1"), "{message}");

        let cubic = GltfLoader::check_output_count(0, 0, 3, 3, InterpolationMode::CubicSpline);
        assert!(matches!(cubic, Err(ViewerError::Gltf(_))));
    }
}
