//! Orbit Controls & Input Tests

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use anim_glass::app::input::Input;
use anim_glass::scene::Transform;
use anim_glass::utils::{FrameClock, OrbitControls};

const EPSILON: f32 = 1e-3;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn input(width: u32, height: u32) -> Input {
    let mut input = Input::new();
    input.handle_resize(width, height);
    input
}

fn undamped(position: Vec3, center: Vec3) -> OrbitControls {
    let mut controls = OrbitControls::from_position(position, center);
    controls.enable_damping = false;
    controls
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn first_cursor_event_only_sets_position() {
    let mut input = Input::new();
    input.handle_cursor_move(100.0, 50.0);
    assert_eq!(input.cursor_delta, Vec2::ZERO);

    input.handle_cursor_move(110.0, 45.0);
    assert_eq!(input.cursor_delta, Vec2::new(10.0, -5.0));
}

#[test]
fn end_frame_clears_deltas_but_keeps_buttons() {
    let mut input = Input::new();
    input.handle_cursor_move(0.0, 0.0);
    input.handle_cursor_move(3.0, 4.0);
    input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
    input.handle_mouse_input(ElementState::Pressed, MouseButton::Left);

    input.end_frame();
    assert_eq!(input.cursor_delta, Vec2::ZERO);
    assert_eq!(input.scroll_delta, Vec2::ZERO);
    assert!(input.is_button_pressed(MouseButton::Left));
}

#[test]
fn cursor_leaving_releases_buttons() {
    let mut input = Input::new();
    input.handle_mouse_input(ElementState::Pressed, MouseButton::Right);
    input.handle_cursor_left();
    assert!(!input.is_button_pressed(MouseButton::Right));
}

// ============================================================================
// OrbitControls
// ============================================================================

#[test]
fn from_position_round_trips_camera_position() {
    let position = Vec3::new(0.0, 4.0, 300.0);
    let controls = OrbitControls::from_position(position, Vec3::ZERO);
    assert!(approx_vec3(controls.position(), position));
    assert!(approx(controls.radius, position.length()));
}

#[test]
fn update_without_input_keeps_camera_still() {
    let mut controls = undamped(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    let mut transform = Transform::new();
    controls.update(&mut transform, &input(800, 600), 40.0, 0.016);

    assert!(approx_vec3(transform.position, Vec3::new(0.0, 0.0, 10.0)));
    // Looking down -Z at the origin.
    let forward = transform.rotation * Vec3::NEG_Z;
    assert!(approx_vec3(forward, Vec3::NEG_Z));
}

#[test]
fn left_drag_orbits_at_constant_radius() {
    let mut controls = undamped(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    let mut input = input(800, 600);
    input.handle_mouse_input(ElementState::Pressed, MouseButton::Left);
    input.handle_cursor_move(400.0, 300.0);
    input.handle_cursor_move(500.0, 300.0);

    let theta_before = controls.theta;
    let mut transform = Transform::new();
    controls.update(&mut transform, &input, 40.0, 0.016);

    assert!(!approx(controls.theta, theta_before));
    assert!(approx(transform.position.length(), 10.0));
}

#[test]
fn vertical_drag_clamps_polar_angle() {
    let mut controls = undamped(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    let mut input = input(800, 600);
    input.handle_mouse_input(ElementState::Pressed, MouseButton::Left);
    input.handle_cursor_move(400.0, 0.0);
    input.handle_cursor_move(400.0, 100_000.0);

    let mut transform = Transform::new();
    controls.update(&mut transform, &input, 40.0, 0.016);

    assert!(controls.phi > 0.0 && controls.phi < PI);
    assert!(transform.position.is_finite());
}

#[test]
fn scroll_zooms_within_limits() {
    let mut controls = undamped(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    controls.min_distance = 5.0;
    let mut transform = Transform::new();

    let mut zoom_in = input(800, 600);
    zoom_in.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
    controls.update(&mut transform, &zoom_in, 40.0, 0.016);
    assert!(controls.radius < 10.0);

    zoom_in.scroll_delta = Vec2::new(0.0, 1000.0);
    controls.update(&mut transform, &zoom_in, 40.0, 0.016);
    assert!(approx(controls.radius, 5.0));
}

#[test]
fn right_drag_pans_center() {
    let mut controls = undamped(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    let mut input = input(800, 600);
    input.handle_mouse_input(ElementState::Pressed, MouseButton::Right);
    input.handle_cursor_move(400.0, 300.0);
    input.handle_cursor_move(450.0, 300.0);

    let mut transform = Transform::new();
    controls.update(&mut transform, &input, 40.0, 0.016);

    assert!(controls.center.x.abs() > 0.0);
    assert!(approx(controls.center.y, 0.0));
    assert!(approx((transform.position - controls.center).length(), 10.0));
}

#[test]
fn disabled_controls_ignore_input() {
    let mut controls = undamped(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    controls.enabled = false;
    let mut input = input(800, 600);
    input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 5.0));

    let mut transform = Transform::new();
    controls.update(&mut transform, &input, 40.0, 0.016);
    assert!(approx(controls.radius, 10.0));
}

// ============================================================================
// FrameClock
// ============================================================================

#[test]
fn frame_clock_reports_seconds_between_frames() {
    let mut clock = FrameClock::new();
    assert!(approx(clock.advance(1000.0), 0.0));
    assert!(approx(clock.advance(1016.0), 0.016));
    assert!(approx(clock.advance(1050.0), 0.034));
}
