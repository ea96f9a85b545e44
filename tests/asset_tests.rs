//! Asset Loading Tests
//!
//! Tests for:
//! - GltfLoader: hierarchy, scene roots, clip names and durations
//! - Animation channels whose outputs do not match their keyframes
//! - Buffer resolution: data URIs, missing external files
//! - Image decoding failures
//! - AssetLoader: async background and model loads, error delivery

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;

use anim_glass::animation::{TargetPath, TrackData};
use anim_glass::assets::{AssetEvent, AssetLoader, GltfLoader};
use anim_glass::resources::Image;
use anim_glass::ViewerError;

const WAIT: Duration = Duration::from_secs(10);

// Little-endian f32 data:
//   [0..12)  times      0, 0.5, 1
//   [12..48) positions  (0,0,0) (0,1,0) (0,2,0)
//   [48..56) times      0, 2
//   [56..88) rotations  identity, 90 degrees about +Y
const BUFFER_BASE64: &str = "AAAAAAAAAD8AAIA/AAAAAAAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAEAAAAAAAAAAAAAAAEAAAAAAAAAAAAAAAAAAAIA/AAAAAPQENT8AAAAA9AQ1Pw==";

fn gltf_document(buffer_uri: &str) -> Vec<u8> {
    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Armature", "children": [1] },
            { "name": "Hips", "translation": [0.0, 1.0, 0.0] }
        ],
        "buffers": [{ "byteLength": 88, "uri": buffer_uri }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 12 },
            { "buffer": 0, "byteOffset": 12, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 48, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 56, "byteLength": 32 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "SCALAR", "min": [0.0], "max": [1.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [2.0] },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC4" }
        ],
        "animations": [
            {
                "name": "Break",
                "samplers": [{ "input": 0, "output": 1, "interpolation": "LINEAR" }],
                "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }]
            },
            {
                "name": "Idle",
                "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }],
                "channels": [{ "sampler": 0, "target": { "node": 1, "path": "rotation" } }]
            },
            {
                "samplers": [{ "input": 0, "output": 1, "interpolation": "STEP" }],
                "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }]
            }
        ]
    });
    serde_json::to_vec(&document).unwrap()
}

fn embedded_gltf() -> Vec<u8> {
    gltf_document(&format!("data:application/octet-stream;base64,{BUFFER_BASE64}"))
}

fn temp_path(file_name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("anim-glass-{}-{file_name}", std::process::id()))
}

// ============================================================================
// GltfLoader
// ============================================================================

#[test]
fn parse_reads_hierarchy_and_roots() {
    let asset = GltfLoader::parse(&embedded_gltf(), Path::new("."), "Robot").unwrap();

    assert_eq!(asset.name, "Robot");
    assert_eq!(asset.roots, [0]);
    assert_eq!(asset.nodes.len(), 2);
    assert_eq!(asset.nodes[0].name, "Armature");
    assert_eq!(asset.nodes[0].children, [1]);
    assert_eq!(asset.nodes[1].translation, glam::Vec3::new(0.0, 1.0, 0.0));
    assert!(asset.meshes.is_empty());
    assert!(asset.skins.is_empty());
}

#[test]
fn parse_keeps_clip_order_and_names() {
    let asset = GltfLoader::parse(&embedded_gltf(), Path::new("."), "Robot").unwrap();
    let names: Vec<_> = asset.clip_names().collect();
    // Unnamed clips get a positional name.
    assert_eq!(names, ["Break", "Idle", "Animation_2"]);
}

#[test]
fn parse_computes_clip_durations_and_targets() {
    let asset = GltfLoader::parse(&embedded_gltf(), Path::new("."), "Robot").unwrap();

    let brk = &asset.animations[0];
    assert!((brk.duration - 1.0).abs() < 1e-6);
    assert_eq!(brk.tracks.len(), 1);
    assert_eq!(brk.tracks[0].meta.node_name, "Hips");
    assert!(matches!(brk.tracks[0].meta.target, TargetPath::Translation));
    assert!(matches!(brk.tracks[0].data, TrackData::Vector3(_)));

    let idle = &asset.animations[1];
    assert!((idle.duration - 2.0).abs() < 1e-6);
    assert!(matches!(idle.tracks[0].meta.target, TargetPath::Rotation));
    assert!(matches!(idle.tracks[0].data, TrackData::Quaternion(_)));

    assert_eq!(asset.animations[2].tracks[0].meta.node_name, "Armature");
}

#[test]
fn parse_rejects_outputs_that_do_not_match_keyframes() {
    // "Break" keeps three keyframe times but only two translations.
    let mut document: serde_json::Value = serde_json::from_slice(&embedded_gltf()).unwrap();
    document["accessors"][1]["count"] = json!(2);
    let bytes = serde_json::to_vec(&document).unwrap();

    match GltfLoader::parse(&bytes, Path::new("."), "Robot") {
        Err(ViewerError::Gltf(message)) => assert!(message.contains("Animation 0"), "{message}"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("mismatched animation outputs were accepted"),
    }
}

#[test]
fn parse_rejects_garbage() {
    let result = GltfLoader::parse(b"definitely not a model", Path::new("."), "Broken");
    assert!(matches!(result, Err(ViewerError::Gltf(_))));
}

#[test]
fn parse_reports_missing_external_buffer() {
    let document = gltf_document("no-such-buffer.bin");
    let result = GltfLoader::parse(&document, &std::env::temp_dir(), "Robot");
    assert!(matches!(result, Err(ViewerError::Io(_))));
}

#[test]
fn parse_resolves_external_buffer_relative_to_base_path() {
    use base64::Engine as _;

    let dir = temp_path("external");
    std::fs::create_dir_all(&dir).unwrap();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(BUFFER_BASE64)
        .unwrap();
    std::fs::write(dir.join("robot.bin"), bytes).unwrap();

    let asset = GltfLoader::parse(&gltf_document("robot.bin"), &dir, "Robot").unwrap();
    assert_eq!(asset.animations.len(), 3);

    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================================
// Images
// ============================================================================

#[test]
fn image_decode_rejects_garbage() {
    let result = Image::decode("noise", &[0x13, 0x37, 0x00, 0xFF]);
    assert!(matches!(result, Err(ViewerError::ImageDecode(_))));
}

#[test]
fn images_get_unique_ids() {
    let a = Image::solid("a", [255, 0, 0, 255]);
    let b = Image::solid("b", [255, 0, 0, 255]);
    assert_ne!(a.id(), b.id());
    assert_ne!(a, b);
    assert!((a.aspect() - 1.0).abs() < 1e-6);
}

// ============================================================================
// AssetLoader
// ============================================================================

#[test]
fn loader_reports_missing_model() {
    let mut loader = AssetLoader::new().unwrap();
    loader.request_model("definitely/missing/model.glb");
    assert_eq!(loader.pending(), 1);

    let event = loader.wait(WAIT).expect("load should finish");
    assert_eq!(event.path(), Path::new("definitely/missing/model.glb"));
    assert!(matches!(
        event,
        AssetEvent::Model {
            result: Err(ViewerError::Io(_)),
            ..
        }
    ));
    assert_eq!(loader.pending(), 0);
}

#[test]
fn loader_decodes_background_image() {
    let path = temp_path("background.png");
    image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
        .save(&path)
        .unwrap();

    let mut loader = AssetLoader::new().unwrap();
    loader.request_background(&path);

    match loader.wait(WAIT) {
        Some(AssetEvent::Background { result: Ok(image), .. }) => {
            assert_eq!((image.width, image.height), (4, 2));
            assert_eq!(&image.pixels[..4], &[10, 20, 30, 255]);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn loader_names_model_after_file_stem() {
    let path = temp_path("walker.gltf");
    std::fs::write(&path, embedded_gltf()).unwrap();

    let mut loader = AssetLoader::new().unwrap();
    loader.request_model(&path);

    match loader.wait(WAIT) {
        Some(AssetEvent::Model { result: Ok(asset), .. }) => {
            assert!(asset.name.ends_with("walker"));
            assert_eq!(asset.clip_names().next(), Some("Break"));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn poll_never_blocks() {
    let mut loader = AssetLoader::new().unwrap();
    assert!(loader.poll().is_empty());
    assert_eq!(loader.pending(), 0);
}
