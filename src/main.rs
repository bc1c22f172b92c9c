// Entrypoint for the CLI application.
// - Keeps `main` small: load configuration and hand a console terminal to
//   the UI loop.
// - Every failure is reported once here, as a plain message plus exit code.

use std::process::ExitCode;

use cougar_craves::config::Config;
use cougar_craves::error::{report, AppError};
use cougar_craves::ui::{self, ConsoleTerminal};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    // Diagnostics go to stderr and stay quiet unless RUST_LOG asks for more.
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let result = Config::load()
        .map_err(|e| anyhow::Error::new(AppError::from(e)))
        .and_then(|config| ui::run(&mut ConsoleTerminal, &config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{err:#}");
            let (message, code) = report(&err);
            println!("{message}");
            code
        }
    }
}
