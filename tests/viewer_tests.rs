//! Viewer Tests
//!
//! Tests for:
//! - Clip setup: one button and one mapping entry per clip, default clip playing
//! - change_animation: no-op on the current clip, cross-fade otherwise, unknown names
//! - Resize handling and camera aspect
//! - Frame loop: mixer advanced by the timestamp delta, render target resized
//! - Panel clicks routed through the command queue
//! - Load results: background applied, failures reported in the panel

use std::path::PathBuf;
use std::sync::Arc;

use glam::{Quat, Vec3};

use anim_glass::ViewerError;
use anim_glass::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use anim_glass::assets::{AssetEvent, ModelAsset, NodeDesc};
use anim_glass::config::ViewerConfig;
use anim_glass::render::RenderTarget;
use anim_glass::resources::Image;
use anim_glass::scene::{Camera, Scene};
use anim_glass::ui::ClipPanel;
use anim_glass::viewer::{SurfaceSize, Viewer, ViewerCommand};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Fixtures
// ============================================================================

/// Records what the viewer asks of the GPU side.
#[derive(Default)]
struct RecordingTarget {
    size: SurfaceSize,
    resizes: Vec<SurfaceSize>,
    frames: usize,
    last_buttons: Vec<String>,
}

impl RenderTarget for RecordingTarget {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.resizes.push(size);
    }

    fn render(&mut self, _scene: &Scene, _camera: &Camera, panel: &ClipPanel) -> anim_glass::Result<()> {
        self.frames += 1;
        self.last_buttons = panel.buttons().to_vec();
        Ok(())
    }
}

fn clip(name: &str, offset: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: "Hips".to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![Vec3::new(offset, 0.0, 0.0), Vec3::new(offset, 1.0, 0.0)],
                InterpolationMode::Linear,
            )),
        }],
    ))
}

fn model(clip_names: &[&str]) -> ModelAsset {
    let node = |name: &str, children: Vec<usize>| NodeDesc {
        name: name.to_string(),
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        children,
        mesh: None,
        skin: None,
    };

    ModelAsset {
        name: "Robot".to_string(),
        nodes: vec![node("Armature", vec![1]), node("Hips", vec![])],
        roots: vec![0],
        meshes: Vec::new(),
        skins: Vec::new(),
        animations: clip_names
            .iter()
            .enumerate()
            .map(|(i, name)| clip(name, i as f32))
            .collect(),
    }
}

fn config() -> ViewerConfig {
    let mut config = ViewerConfig::default().with_model("tests/data/does-not-exist.glb");
    config.assets.background = None;
    config
}

fn viewer() -> Viewer {
    Viewer::new(config(), SurfaceSize::new(1280, 720)).unwrap()
}

fn loaded_viewer() -> Viewer {
    let mut viewer = viewer();
    viewer
        .on_model_loaded(&model(&["Break", "Walk", "Run"]))
        .unwrap();
    viewer
}

// ============================================================================
// Setup
// ============================================================================

#[test]
fn setup_creates_one_button_per_clip_in_order() {
    let viewer = loaded_viewer();
    assert_eq!(viewer.panel().buttons(), ["Break", "Walk", "Run"]);

    let controller = viewer.animation().unwrap();
    assert_eq!(controller.mapped_count(), 3);
    for name in ["Break", "Walk", "Run"] {
        assert!(controller.action_for(name).is_some(), "missing action for {name}");
    }
}

#[test]
fn setup_runs_only_the_default_clip() {
    let viewer = loaded_viewer();
    let controller = viewer.animation().unwrap();

    assert_eq!(controller.current_clip(), "Break");
    let running: Vec<&str> = controller
        .mixer()
        .actions()
        .filter(|(_, a)| a.is_running())
        .map(|(_, a)| a.name())
        .collect();
    assert_eq!(running, ["Break"]);
    assert_eq!(viewer.panel().active(), Some("Break"));
}

#[test]
fn setup_without_default_clip_names_available_clips() {
    let mut viewer = viewer();
    let err = viewer.on_model_loaded(&model(&["Walk", "Run"])).unwrap_err();

    match err {
        ViewerError::DefaultClipMissing { name, available } => {
            assert_eq!(name, "Break");
            assert_eq!(available, ["Walk", "Run"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    // The model itself is still shown.
    assert!(viewer.model_root().is_some());
    assert!(viewer.animation().is_none());
}

#[test]
fn setup_honors_configured_default_clip() {
    let config = config().with_default_clip("Run");
    let mut viewer = Viewer::new(config, SurfaceSize::new(640, 480)).unwrap();
    viewer.on_model_loaded(&model(&["Break", "Walk", "Run"])).unwrap();
    assert_eq!(viewer.animation().unwrap().current_clip(), "Run");
}

#[test]
fn duplicate_clip_names_keep_every_button() {
    let mut viewer = viewer();
    viewer
        .on_model_loaded(&model(&["Break", "Walk", "Walk"]))
        .unwrap();

    assert_eq!(viewer.panel().buttons().len(), 3);
    let controller = viewer.animation().unwrap();
    assert_eq!(controller.mapped_count(), 2);
    assert_eq!(controller.clip_names().len(), 3);
}

#[test]
fn second_model_is_ignored() {
    let mut viewer = loaded_viewer();
    let root = viewer.model_root();
    viewer.on_model_loaded(&model(&["Other"])).unwrap();

    assert_eq!(viewer.model_root(), root);
    assert_eq!(viewer.panel().buttons(), ["Break", "Walk", "Run"]);
}

// ============================================================================
// change_animation
// ============================================================================

#[test]
fn change_to_current_clip_is_a_no_op() {
    let mut viewer = loaded_viewer();
    let controller = viewer.animation_mut().unwrap();

    assert!(!controller.change_animation("Break").unwrap());
    assert_eq!(controller.current_clip(), "Break");
    assert!(controller.action("Break").unwrap().fade().is_none());
}

#[test]
fn change_cross_fades_between_clips() {
    let mut viewer = loaded_viewer();
    let mut target = RecordingTarget::default();
    viewer.frame(1000.0, &mut target);
    viewer.frame(1300.0, &mut target);

    let controller = viewer.animation_mut().unwrap();
    assert!(controller.change_animation("Walk").unwrap());
    assert_eq!(controller.current_clip(), "Walk");

    let previous = controller.action("Break").unwrap();
    assert!(previous.fade().unwrap().is_fading_out());

    let next = controller.action("Walk").unwrap();
    assert!(next.fade().unwrap().is_fading_in());
    assert!(next.is_running());
    assert!(approx(next.time, 0.0));
    assert!(approx(next.effective_weight(), 0.0));
}

#[test]
fn cross_fade_completes_after_fade_duration() {
    let mut viewer = loaded_viewer();
    let mut target = RecordingTarget::default();
    viewer.frame(0.0, &mut target);
    viewer.animation_mut().unwrap().change_animation("Walk").unwrap();

    viewer.frame(250.0, &mut target);
    {
        let controller = viewer.animation().unwrap();
        let old = controller.action("Break").unwrap().effective_weight();
        let new = controller.action("Walk").unwrap().effective_weight();
        assert!((old - 0.5).abs() < 1e-3 && (new - 0.5).abs() < 1e-3, "{old} / {new}");
    }

    viewer.frame(600.0, &mut target);
    let controller = viewer.animation().unwrap();
    let old = controller.action("Break").unwrap();
    let new = controller.action("Walk").unwrap();
    assert!(!old.enabled);
    assert!(approx(new.effective_weight(), 1.0));
}

#[test]
fn rapid_switches_keep_two_weighted_actions() {
    let mut viewer = loaded_viewer();
    let controller = viewer.animation_mut().unwrap();
    controller.change_animation("Walk").unwrap();
    controller.change_animation("Run").unwrap();

    let scheduled: Vec<&str> = controller
        .mixer()
        .actions()
        .filter(|(_, a)| a.is_scheduled())
        .map(|(_, a)| a.name())
        .collect();
    assert_eq!(scheduled.len(), 2);
    assert!(scheduled.contains(&"Walk") && scheduled.contains(&"Run"));
}

#[test]
fn unknown_clip_is_rejected_without_state_change() {
    let mut viewer = loaded_viewer();
    let controller = viewer.animation_mut().unwrap();

    let err = controller.change_animation("Jump").unwrap_err();
    assert!(matches!(err, ViewerError::UnknownClip(ref name) if name == "Jump"));
    assert_eq!(controller.current_clip(), "Break");
    assert!(controller.action("Break").unwrap().fade().is_none());
}

#[test]
fn command_before_model_load_is_ignored() {
    let mut viewer = viewer();
    viewer.handle_command(ViewerCommand::ChangeAnimation("Walk".to_string()));
    assert!(viewer.animation().is_none());
}

#[test]
fn clicks_after_failed_setup_leave_state_alone() {
    let mut viewer = viewer();
    assert!(viewer.on_model_loaded(&model(&["Walk", "Run"])).is_err());
    assert_eq!(viewer.panel().buttons(), ["Walk", "Run"]);

    assert!(viewer.panel().click("Walk"));
    viewer.pump();

    assert!(viewer.model_root().is_some());
    assert!(viewer.animation().is_none());
    assert_eq!(viewer.panel().active(), None);
}

// ============================================================================
// Asset events
// ============================================================================

fn not_found() -> ViewerError {
    ViewerError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
}

#[test]
fn loaded_background_is_applied_to_scene() {
    let mut viewer = viewer();
    assert!(viewer.scene().background.is_none());

    viewer.handle_asset_event(AssetEvent::Background {
        path: PathBuf::from("data/cac1web.jpg"),
        result: Ok(Arc::new(Image::solid("sky", [40, 60, 90, 255]))),
    });

    let background = viewer.scene().background.as_ref().unwrap();
    assert_eq!((background.width, background.height), (1, 1));
    assert_eq!(viewer.panel().status(), None);
}

#[test]
fn failed_background_is_reported_in_panel() {
    let mut viewer = viewer();
    viewer.handle_asset_event(AssetEvent::Background {
        path: PathBuf::from("data/cac1web.jpg"),
        result: Err(not_found()),
    });

    assert!(viewer.scene().background.is_none());
    let status = viewer.panel().status().unwrap();
    assert!(status.contains("Background failed"), "{status}");
}

#[test]
fn failed_model_is_reported_in_panel() {
    let mut viewer = viewer();
    viewer.handle_asset_event(AssetEvent::Model {
        path: PathBuf::from("data4/model.glb"),
        result: Err(not_found()),
    });

    let status = viewer.panel().status().unwrap();
    assert!(status.contains("Model failed"), "{status}");
    assert!(viewer.animation().is_none());
    assert!(viewer.model_root().is_none());
    assert!(viewer.panel().buttons().is_empty());
}

#[test]
fn loaded_model_event_sets_up_clips() {
    let mut viewer = viewer();
    viewer.handle_asset_event(AssetEvent::Model {
        path: PathBuf::from("data4/model.glb"),
        result: Ok(Arc::new(model(&["Break", "Walk"]))),
    });

    assert!(viewer.model_root().is_some());
    assert_eq!(viewer.animation().unwrap().current_clip(), "Break");
    assert_eq!(viewer.panel().status(), None);
}

#[test]
fn missing_default_clip_is_reported_in_panel() {
    let mut viewer = viewer();
    viewer.handle_asset_event(AssetEvent::Model {
        path: PathBuf::from("data4/model.glb"),
        result: Ok(Arc::new(model(&["Walk"]))),
    });

    let status = viewer.panel().status().unwrap();
    assert!(status.contains("Break"), "{status}");
    assert!(viewer.animation().is_none());
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn resize_updates_aspect_and_surface() {
    let mut viewer = viewer();
    assert!(viewer.resize(800, 600));
    assert!(approx(viewer.camera().aspect, 800.0 / 600.0));
    assert_eq!(viewer.surface_size(), SurfaceSize::new(800, 600));

    // Idempotent
    assert!(viewer.resize(800, 600));
    assert!(approx(viewer.camera().aspect, 800.0 / 600.0));
    assert_eq!(viewer.surface_size(), SurfaceSize::new(800, 600));
}

#[test]
fn zero_sized_resize_is_skipped() {
    let mut viewer = viewer();
    assert!(!viewer.resize(800, 0));
    assert!(!viewer.resize(0, 600));
    assert_eq!(viewer.surface_size(), SurfaceSize::new(1280, 720));
    assert!(approx(viewer.camera().aspect, 1280.0 / 720.0));
}

#[test]
fn frame_resizes_render_target_to_surface() {
    let mut viewer = viewer();
    let mut target = RecordingTarget::default();
    viewer.frame(0.0, &mut target);
    assert_eq!(target.resizes, [SurfaceSize::new(1280, 720)]);

    // Unchanged size: no further resize
    viewer.frame(16.0, &mut target);
    assert_eq!(target.resizes.len(), 1);

    viewer.resize(1024, 768);
    viewer.frame(32.0, &mut target);
    assert_eq!(target.size, SurfaceSize::new(1024, 768));
    assert_eq!(target.frames, 3);
}

// ============================================================================
// Frame loop
// ============================================================================

#[test]
fn frame_advances_mixer_by_timestamp_delta() {
    let mut viewer = loaded_viewer();
    let mut target = RecordingTarget::default();

    let first = viewer.frame(1000.0, &mut target);
    assert!(approx(first, 0.0));

    let second = viewer.frame(1016.0, &mut target);
    assert!((second - 0.016).abs() < 1e-4, "delta {second}");

    let mixer_time = viewer.animation().unwrap().mixer().time();
    assert!((mixer_time - 0.016).abs() < 1e-4, "mixer time {mixer_time}");
    assert!((viewer.animation().unwrap().action("Break").unwrap().time - 0.016).abs() < 1e-4);
}

#[test]
fn frame_poses_the_model() {
    let mut viewer = loaded_viewer();
    let mut target = RecordingTarget::default();
    viewer.frame(0.0, &mut target);
    viewer.frame(500.0, &mut target);

    let root = viewer.model_root().unwrap();
    let hips = viewer.scene().find_by_name(root, "Hips").unwrap();
    let position = viewer.scene().get_node(hips).unwrap().transform.position;
    // "Break" slides Hips from y=0 to y=1 over one second.
    assert!((position.y - 0.5).abs() < 1e-4, "{position}");
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn clicking_buttons_switches_clips() {
    let mut viewer = loaded_viewer();
    let mut target = RecordingTarget::default();
    viewer.frame(0.0, &mut target);
    assert_eq!(target.last_buttons, ["Break", "Walk", "Run"]);
    assert_eq!(viewer.animation().unwrap().current_clip(), "Break");

    assert!(viewer.panel().click("Walk"));
    viewer.frame(16.0, &mut target);
    assert_eq!(viewer.animation().unwrap().current_clip(), "Walk");
    assert_eq!(viewer.panel().active(), Some("Walk"));

    let fade_before = *viewer.animation().unwrap().action("Walk").unwrap().fade().unwrap();
    assert!(viewer.panel().click("Walk"));
    viewer.pump();
    let controller = viewer.animation().unwrap();
    assert_eq!(controller.current_clip(), "Walk");
    assert_eq!(*controller.action("Walk").unwrap().fade().unwrap(), fade_before);
}

#[test]
fn clicking_unknown_label_sends_nothing() {
    let viewer = loaded_viewer();
    assert!(!viewer.panel().click("Jump"));
    assert!(viewer.commands().is_empty());
}
