//! Obesitrack: obesity level triage in the terminal
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use obesitrack::adapters::sanitize::SanitizingMakeWriter;
use obesitrack::tui::App;
use obesitrack::AppConfig;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Logs on the terminal would corrupt the alternate screen, so an
    // interactive session logs to a file unless told otherwise.
    let interactive = std::io::stdout().is_terminal();

    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!(
        "Starting Obesitrack (model: {}, dataset: {})",
        config.model_path.display(),
        config.dataset_path.display()
    );

    let mut app = App::new(&config);
    app.run()?;

    tracing::info!("Obesitrack shutdown complete.");
    Ok(())
}
