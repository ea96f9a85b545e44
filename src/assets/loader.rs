use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::assets::loaders::GltfLoader;
use crate::assets::model::ModelAsset;
use crate::errors::{Result, ViewerError};
use crate::resources::Image;

/// Outcome of an asynchronous load, delivered to the UI thread.
#[derive(Debug)]
pub enum AssetEvent {
    Background {
        path: PathBuf,
        result: Result<Arc<Image>>,
    },
    Model {
        path: PathBuf,
        result: Result<Arc<ModelAsset>>,
    },
}

impl AssetEvent {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Background { path, .. } | Self::Model { path, .. } => path,
        }
    }
}

/// Fire-and-forget file loading on a small tokio runtime.
///
/// Files are read with `tokio::fs` and decoded on blocking workers. Results
/// come back over a flume channel; the owner drains it with
/// [`poll`](Self::poll) once per frame. Loaded data never touches the scene
/// from worker threads.
pub struct AssetLoader {
    runtime: Option<Runtime>,
    sender: flume::Sender<AssetEvent>,
    receiver: flume::Receiver<AssetEvent>,
    in_flight: usize,
}

impl AssetLoader {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("asset-loader")
            .build()
            .map_err(|e| ViewerError::Runtime(e.to_string()))?;
        let (sender, receiver) = flume::unbounded();

        Ok(Self {
            runtime: Some(runtime),
            sender,
            receiver,
            in_flight: 0,
        })
    }

    /// Requests that the image at `path` be decoded.
    pub fn request_background(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        log::info!("Loading background {}", path.display());
        let sender = self.sender.clone();
        self.spawn(async move {
            let result = load_image(&path).await;
            // Receiver gone means the viewer shut down.
            let _ = sender.send(AssetEvent::Background { path, result });
        });
    }

    /// Requests that the glTF/GLB file at `path` be parsed.
    pub fn request_model(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        log::info!("Loading model {}", path.display());
        let sender = self.sender.clone();
        self.spawn(async move {
            let result = load_model(&path).await;
            let _ = sender.send(AssetEvent::Model { path, result });
        });
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        if let Some(runtime) = &self.runtime {
            runtime.spawn(task);
            self.in_flight += 1;
        }
    }

    /// Drains every finished load without blocking.
    pub fn poll(&mut self) -> Vec<AssetEvent> {
        let events: Vec<_> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(events.len());
        events
    }

    /// Blocks until one load finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<AssetEvent> {
        let event = self.receiver.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    /// Loads requested but not yet drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        // Don't block the UI thread on decodes nobody will consume.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn load_image(path: &Path) -> Result<Arc<Image>> {
    let bytes = tokio::fs::read(path).await?;
    let label = path.display().to_string();
    let image = tokio::task::spawn_blocking(move || Image::decode(&label, &bytes)).await??;
    Ok(Arc::new(image))
}

async fn load_model(path: &Path) -> Result<Arc<ModelAsset>> {
    let bytes = tokio::fs::read(path).await?;
    let base_path = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string();

    let asset =
        tokio::task::spawn_blocking(move || GltfLoader::parse(&bytes, &base_path, &name)).await??;
    Ok(Arc::new(asset))
}
