use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chromedriver_manager::{
    DriverInstaller, InstallOptions, ManagerConfig, VersionNumber, WebDriverError,
};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Parser)]
#[command(name = "chromedriver-manager")]
#[command(version, about = "Installs or updates the chromedriver matching your Chrome")]
struct Cli {
    /// Directory to install chromedriver into (defaults to the app data folder)
    #[arg(short, long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Browser version to match, e.g. 114 or 114.0.5735.90 (defaults to the installed Chrome)
    #[arg(long = "version-target", alias = "driver-version", value_name = "VERSION")]
    version_target: Option<VersionNumber>,

    /// Chrome executable to read the version from
    #[arg(short, long, value_name = "PATH")]
    browser: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let installer = DriverInstaller::new(ManagerConfig::for_current_platform()?)?;

    let options = InstallOptions {
        destination_dir: cli.dest.map(|dir| dunce::simplified(&dir).to_path_buf()),
        version: cli.version_target,
        browser_path: cli.browser,
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            ctrl_c.cancel();
        }
    });

    match installer.install(&options, &cancel).await {
        Ok(outcome) => {
            println!("{}", outcome);
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Err(
            e @ (WebDriverError::BrowserNotFound
            | WebDriverError::VersionUnreadable { .. }
            | WebDriverError::InvalidVersionFormat { .. }),
        ) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("chromedriver_manager=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chromedriver_manager=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
