use std::io::{self, IsTerminal};

use clap::ValueEnum;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

pub const LOG_ENV_VAR: &str = "PCNT_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Color {
    Never,
    Auto,
    Always,
}

impl Color {
    pub fn use_colors(&self) -> bool {
        match self {
            Self::Never => false,
            Self::Auto => io::stderr().is_terminal(),
            Self::Always => true,
        }
    }
}

/// Installs the global subscriber. Filter directives come from `PCNT_LOG`,
/// `info` when it is unset.
pub fn init_logger(color: Color) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(color.use_colors())
            .with_target(true),
    );

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
