use std::path::PathBuf;

use clap::Parser;

use syncgate::tester::config::TesterConfig;
use syncgate::tester::logging::init_file_logging;
use syncgate::tester::runner::SyncTester;

/// Replays a folder of JSON documents against a running gateway.
#[derive(Debug, Parser)]
#[command(name = "sync-tester", version)]
struct Args {
    /// Tester configuration file (JSON)
    config_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg = TesterConfig::load(&args.config_file)?;
    let log_path = init_file_logging(&cfg.log_path_to_write_to, cfg.debug)?;
    let tester = SyncTester::new(cfg)?;
    let summary = tester.run().await?;
    println!(
        "{} documents, {} operations succeeded, {} failed; log written to {}",
        summary.documents,
        summary.succeeded,
        summary.failed,
        log_path.display()
    );
    Ok(())
}
