//! Helm console binary.
//!
//! # Usage
//!
//! ```bash
//! # Connect to a vehicle on the local network
//! helm-console --host 192.168.4.1 --port 8765
//! ```

use clap::Parser;
use helm_app::{Console, Runtime};
use helm_console::{driver::ConsoleDriver, terminal::TerminalGuard};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Helm teleoperation console
#[derive(Parser, Debug)]
#[command(name = "helm-console")]
#[command(about = "Terminal teleoperation console for a remote salvage vessel")]
#[command(version)]
struct Args {
    /// Vehicle host address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Vehicle control port
    #[arg(long, default_value = "8765")]
    port: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Raw mode owns stdout; logs go to stderr so they stay readable.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!(host = %args.host, port = %args.port, "helm console starting");

    let _guard = TerminalGuard::new()?;
    let driver = ConsoleDriver::new(args.host, args.port);
    let runtime = Runtime::new(driver, Console::new());

    Ok(runtime.run().await?)
}
