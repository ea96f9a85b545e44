//! Error Types
//!
//! This module defines the error type shared by every subsystem of the viewer.
//!
//! # Overview
//!
//! [`ViewerError`] covers:
//! - GPU and window initialization failures
//! - Asset loading and decoding errors (background image, glTF model)
//! - Animation clip lookup failures
//! - Configuration parsing errors
//!
//! All fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, ViewerError>`.

use thiserror::Error;

/// The main error type for the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    // ========================================================================
    // GPU & Window Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter or surface.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Window creation error (winit).
    #[error("Window creation error: {0}")]
    WindowCreate(#[from] winit::error::OsError),

    /// The swapchain could not provide a frame.
    #[error("Surface error: {0}")]
    Surface(String),

    /// The async asset runtime could not be started.
    #[error("Asset runtime error: {0}")]
    Runtime(String),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Asset index out of bounds.
    #[error("Asset index out of bounds: {context} (index: {index})")]
    AssetIndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// A clip name was requested that the loaded model does not contain.
    #[error("Unknown animation clip: {0:?}")]
    UnknownClip(String),

    /// The configured default clip is missing from the loaded model.
    #[error("Default clip {name:?} not found in model (available: {available:?})")]
    DefaultClipMissing {
        /// The configured default clip name
        name: String,
        /// Clip names present in the model, in asset order
        available: Vec<String>,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for ViewerError {
    fn from(err: image::ImageError) -> Self {
        ViewerError::ImageDecode(err.to_string())
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(err: gltf::Error) -> Self {
        ViewerError::Gltf(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ViewerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ViewerError::Runtime(err.to_string())
    }
}

/// Alias for `Result<T, ViewerError>`.
pub type Result<T> = std::result::Result<T, ViewerError>;
