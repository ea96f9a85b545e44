//! Camera controls and frame timing.

pub mod orbit_control;
pub mod time;

pub use orbit_control::OrbitControls;
pub use time::FrameClock;
