mod cli;

use clap::{CommandFactory, Parser};
use cli::Cli;
use krsite_dl::batch::{self, BatchSummary};
use krsite_dl::config::Config;
use krsite_dl::error::PipelineError;
use krsite_dl::observability::init_tracing;
use krsite_dl::pipeline::Pipeline;
use tracing::{info, warn};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let inputs = cli.inputs();
    if inputs.is_empty() {
        Cli::command().print_help()?;
        std::process::exit(2);
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path.clone())?,
        None => Config::load()?,
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    let pipeline = Pipeline::from_config(&config)?;
    info!(
        destination = %config.download.destination.display(),
        workers = config.download.workers,
        "Starting"
    );

    // Dropping the run future abandons in-flight fetches; their temp files
    // are removed as the writers unwind.
    let outcome = tokio::select! {
        result = batch::run_inputs(&pipeline, &inputs) => Some(result),
        _ = shutdown_signal() => None,
    };

    match outcome {
        Some(Ok(summary)) => report(&summary, &pipeline),
        Some(Err(PipelineError::Usage(msg))) => {
            eprintln!("krsite-dl: {msg}");
            std::process::exit(2);
        }
        Some(Err(e)) => return Err(e.into()),
        None => {
            eprintln!("\nInterrupted, stopping. Completed images are kept; rerun to resume.");
        }
    }

    Ok(())
}

fn report(summary: &BatchSummary, pipeline: &Pipeline) {
    let counters = pipeline.metrics().snapshot();
    info!(
        posts = counters.posts_processed,
        posts_failed = counters.posts_failed,
        downloaded = counters.images_downloaded,
        skipped = counters.images_skipped,
        images_failed = counters.images_failed,
        "Run counters"
    );

    println!("{}", summary.render());
    if !summary.is_clean() {
        warn!(
            failed_inputs = summary.failures.len(),
            failed_images = summary.totals.failed,
            "Finished with failures"
        );
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Interrupt received");
}
