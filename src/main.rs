use anim_glass::{ViewerApp, ViewerConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            ViewerConfig::from_json_file(&path)?
        }
        None => ViewerConfig::default(),
    }
    .with_env_overrides();

    log::info!(
        "Model: {}, default clip: {:?}",
        config.assets.model.display(),
        config.animation.default_clip
    );

    ViewerApp::new(config).run()?;
    Ok(())
}
