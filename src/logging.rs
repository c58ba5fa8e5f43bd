use anyhow::{Context, Result};
use tracing::Dispatch;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

pub const LOG_ENV_VAR: &str = "GITCONTRIB_LOG";

/// Level implied by the `-q` / `-v` flags.
pub fn level_filter(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Build the stderr log handle for one process. Nothing is installed globally; callers pass the
/// returned dispatch to whatever should log through it.
pub fn dispatch(quiet: bool, verbose: u8) -> Result<Dispatch> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter(quiet, verbose).into())
        .with_env_var(LOG_ENV_VAR)
        .from_env()
        .with_context(|| format!("Failed to parse filters from {LOG_ENV_VAR} environment variable"))?;

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(console::colors_enabled_stderr())
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();

    Ok(Dispatch::new(subscriber))
}
