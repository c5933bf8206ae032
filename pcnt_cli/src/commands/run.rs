use std::{num::ParseIntError, path::PathBuf};

use anyhow::Context;
use clap::Args;
use prog_counter::bench::{self, BenchConfig};
use tracing::{debug, error};

use super::Run;
use crate::logger::{init_logger, Color};

fn parse_u8(s: &str) -> Result<u8, ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Bench configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Byte to shift in and load, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_u8)]
    load_value: Option<u8>,
    /// Number of clock edges counting up
    #[arg(long)]
    steps_up: Option<usize>,
    /// Number of clock edges counting down
    #[arg(long)]
    steps_down: Option<usize>,
    /// Reset length in clock periods
    #[arg(long)]
    reset_cycles: Option<u64>,
    /// Dump the waveform into a VCD file
    #[arg(long)]
    vcd: Option<PathBuf>,
    /// Use colors
    #[arg(long, value_enum, default_value_t = Color::Auto)]
    color: Color,
}

impl RunArgs {
    fn config(&self) -> anyhow::Result<BenchConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => BenchConfig::load(path)
                .with_context(|| format!("failed to read config '{}'", path.display()))?,
            None => BenchConfig::default(),
        };

        if let Some(load_value) = self.load_value {
            config.load_value = load_value;
        }
        if let Some(steps_up) = self.steps_up {
            config.steps_up = steps_up;
        }
        if let Some(steps_down) = self.steps_down {
            config.steps_down = steps_down;
        }
        if let Some(reset_cycles) = self.reset_cycles {
            config.reset_cycles = reset_cycles;
        }
        if let Some(vcd) = self.vcd.as_ref() {
            config.vcd = Some(vcd.clone());
        }

        Ok(config)
    }
}

impl Run for RunArgs {
    fn run(&self) -> anyhow::Result<()> {
        init_logger(self.color)?;

        let config = self.config()?;
        debug!("config = {config:?}");

        match bench::run(&config) {
            Ok(report) => {
                println!("{report}");
                Ok(())
            }
            Err(e) => {
                error!("bench failed: {e}");
                Err(e.into())
            }
        }
    }
}
