use clap::Parser;
use commands::Commands;

mod commands;
mod logger;
mod styles;

pub use logger::{init_logger, Color, LOG_ENV_VAR};

#[derive(Parser)]
#[command(name = "pcnt")]
#[command(version, about, long_about = None)]
#[command(styles = styles::get_styles())]
struct PcntCli {
    #[command(subcommand)]
    command: Commands,
}

pub fn run_cli() -> anyhow::Result<()> {
    let args = PcntCli::parse();

    args.command.run()
}
