mod bootstrap;

use anyhow::Result;
use paddock_core::settings::Settings;
use paddock_runtime::pipeline::Pipeline;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;
    if let Err(e) = bootstrap::ensure_directories() {
        tracing::warn!("Could not create settings directory: {}", e);
    }

    tracing::info!("Paddock v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Raw: {}, Processed: {}, Min appearances: {}",
        settings.raw_dir.display(),
        settings.processed_dir.display(),
        settings.min_appearances
    );

    let summary = Pipeline::new(&settings.raw_dir, &settings.processed_dir)
        .with_min_appearances(settings.threshold())
        .with_parallel(settings.parallel)
        .run();

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    tracing::info!("Finished rebuilding processed data");
    Ok(())
}
