use clap::Parser;
use std::error::Error;

mod args;
use args::{Args, normalize_legacy_flags};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments
    let args = Args::parse_from(normalize_legacy_flags(std::env::args()));
    let config = args.into_config(std::env::var("WEBDRIVER_URL").ok())?;

    init_logging(config.debug);
    ::log::info!("{:?}", config);

    let start_time = std::time::Instant::now();
    let mut stdout = std::io::stdout().lock();
    let summary = multiscrape::execute(&config, &mut stdout, interrupted()).await?;

    ::log::info!(
        "Done - {} links collected, {} pages saved in {:.2} seconds",
        summary.links,
        summary.written.len(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Logs at `info` with `--debug`, `warn` otherwise; `RUST_LOG` still wins
fn init_logging(debug: bool) {
    let level = if debug { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Resolves on Ctrl-C; never resolves if the handler can't be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        ::log::warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
