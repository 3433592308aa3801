use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use testpulse_dashboard::DashboardConfig;

/// TestPulse live metrics dashboard
#[derive(Parser, Debug)]
#[command(name = "testpulse-dashboard", version)]
struct Args {
    /// Directory the test runner writes suite metrics files into
    #[arg(long, env = "TESTPULSE_RESULTS_DIR")]
    results_dir: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "TESTPULSE_LISTEN", default_value = "127.0.0.1:5000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = DashboardConfig {
        results_dir: args
            .results_dir
            .unwrap_or_else(testpulse_common::default_results_dir),
    };

    info!(
        "Starting TestPulse dashboard on http://{} (results: {})",
        args.listen,
        config.results_dir.display()
    );

    testpulse_dashboard::serve(args.listen, config).await
}
