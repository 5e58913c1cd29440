use almanac_app::cli::{Cli, Mode};
use almanac_app::controller::Controller;
use almanac_app::runner::{run, run_headless};
use almanac_core::config::load_config;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    let config = load_config()?;

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping warn");
    }

    tracing::info!(mode = ?cli.mode, config = ?config, "Starting almanac session");

    let mut controller = Controller::new(config, std::io::stdout().lock())?;
    match (cli.mode, cli.file) {
        (Mode::Headless, Some(file)) => run_headless(&mut controller, &file)?,
        (Mode::Headless, None) => anyhow::bail!("headless mode requires a command file"),
        (Mode::Interactive, _) => run(&mut controller, std::io::stdin().lock())?,
    }

    tracing::info!("Session ended");
    Ok(())
}
