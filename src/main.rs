use clap::Parser;
use screenshot_annotator::config::{Args, Command, Config};
use screenshot_annotator::{fingerprint, server, Outcome, Pipeline};
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from(&args);

    tracing::info!(
        "Starting screenshot-annotator v{}",
        env!("CARGO_PKG_VERSION")
    );

    match args.command {
        Command::Serve { .. } => {
            tracing::info!("Binding to {}:{}", config.host, config.port);
            server::run(config).await
        }
        Command::Run { paths } => run_batch(config, paths).await,
    }
}

/// Process local files one at a time until done or interrupted
async fn run_batch(config: Config, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn({
        let running = running.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping after the current image");
                running.store(false, Ordering::SeqCst);
            }
        }
    });

    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let pipeline = Pipeline::from_config(&config)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut stdout = std::io::stdout().lock();
        let (mut annotated, mut skipped, mut duplicates, mut failed) = (0usize, 0usize, 0usize, 0usize);

        for path in &paths {
            if !running.load(Ordering::SeqCst) {
                break;
            }

            match fingerprint::fingerprint(path) {
                Ok(current) if seen.contains(&current) => {
                    tracing::info!("Skipping duplicate screenshot {:?}", path);
                    duplicates += 1;
                    continue;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Cannot verify {:?} is not a duplicate: {}", path, e),
            }

            match pipeline.process(path) {
                Ok(Outcome::Annotated(result)) => {
                    seen.insert(result.fingerprint.clone());
                    serde_json::to_writer(&mut stdout, &result)?;
                    writeln!(stdout)?;
                    annotated += 1;
                }
                Ok(Outcome::Skipped(_)) => skipped += 1,
                Err(_) => failed += 1,
            }
        }

        tracing::info!(
            "Done: {} annotated, {} skipped, {} duplicates, {} failed",
            annotated,
            skipped,
            duplicates,
            failed
        );
        Ok(())
    })
    .await?
}
