//! Vitrine CLI: run the storefront scenario suite
//!
//! ## Usage
//!
//! ```bash
//! vitrine --smoke --headless               # Smoke scenarios in headless Chrome
//! vitrine --cart --parallel 4              # Cart scenarios on four workers
//! vitrine --test login::test_valid_login   # One scenario
//! vitrine --lf --html-report               # Rerun last failures, write HTML
//! vitrine --backend fixture --list         # List scenarios, bundled site
//! ```

use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine::Settings;
use vitrine_cli::{Cli, CliConfig, CliResult, TestRunner, Verbosity};

fn main() -> ExitCode {
    if std::env::args_os().len() <= 1 {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    }
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_directive())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// `Ok(true)` when every selected scenario passed or was skipped
fn run(cli: &Cli) -> CliResult<bool> {
    let config = CliConfig::from_cli(cli);
    init_logging(config.verbosity);

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        settings = settings.with_base_url(base_url.clone());
    }
    let settings = config.backend.prepare(settings);
    let selection = cli.selection();
    let mut runner = TestRunner::new(config, settings);

    if cli.list {
        for scenario in runner.plan(&selection)? {
            println!("{}", scenario.path());
        }
        return Ok(true);
    }

    let report = runner.run(&selection)?;
    Ok(report.is_success())
}
