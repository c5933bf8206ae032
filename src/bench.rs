//! Reference scenario: reset, serial load, count up, count down and the
//! tri-state output, checked step by step.

use std::{
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    bit::{H, L},
    domain::{ClockDomain, CountDom},
    error::{Error, Result},
    logic::TriBus,
    sim::Simulator,
    top::{Pin, ProgCounter},
    trace::Tracer,
    unsigned::U8,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Byte shifted in and loaded into the counter.
    pub load_value: u8,
    pub steps_up: usize,
    pub steps_down: usize,
    /// Reset length in `clk` periods.
    pub reset_cycles: u64,
    /// Dump a VCD waveform here.
    pub vcd: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            load_value: 0xA5,
            steps_up: 5,
            steps_down: 9,
            reset_cycles: 2,
            vcd: None,
        }
    }
}

impl BenchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reset length in picoseconds.
    pub fn reset_time(&self) -> Result<u64> {
        self.reset_cycles
            .checked_mul(CountDom::PERIOD)
            .ok_or(Error::InvalidConfig {
                field: "reset_cycles",
                reason: "overflows the simulation time",
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub time: u64,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub checks: Vec<Check>,
    pub end_time: u64,
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12}  {:<16} value", "time (ps)", "check")?;
        for check in &self.checks {
            writeln!(f, "{:>12}  {:<16} {}", check.time, check.name, check.value)?;
        }
        write!(f, "{} checks passed, end at {} ps", self.checks.len(), self.end_time)
    }
}

struct Bench {
    sim: Simulator,
    report: Report,
}

impl Bench {
    fn check(&mut self, name: &'static str, value: impl Display) {
        info!("{name}: {value}");
        self.report.checks.push(Check {
            name,
            time: self.sim.time(),
            value: value.to_string(),
        });
    }

    fn expect_count(&mut self, name: &'static str, expected: U8) -> Result<()> {
        let found = self.sim.expect_count(expected)?;
        self.check(name, format!("{found:#04x}"));
        Ok(())
    }
}

/// Runs the scenario on a fresh counter. Stops at the first mismatch.
pub fn run(config: &BenchConfig) -> Result<Report> {
    let reset_time = config.reset_time()?;

    let mut sim = Simulator::new(ProgCounter::new());
    if let Some(path) = config.vcd.as_ref() {
        sim = sim.with_tracer(Tracer::create(path, "prog_counter", None)?);
    }

    let mut bench = Bench {
        sim,
        report: Report::default(),
    };

    // Every input starts low.
    bench.sim.set_io_in(U8::ZERO)?;
    bench.sim.start_clock()?;

    info!("asynchronous reset for {} cycles", config.reset_cycles);
    bench.sim.set(Pin::ArstN, L)?;
    bench.sim.run_for(reset_time)?;
    bench.sim.set(Pin::ArstN, H)?;
    bench.sim.rising_edge()?;
    bench.expect_count("reset", U8::ZERO)?;

    let val = U8::from(config.load_value);
    info!("shift in {val:#04x} and load");
    bench.sim.shift_msb_first(val)?;
    bench.sim.pulse(Pin::Load, 1)?;
    bench.expect_count("load", val)?;

    info!("count up {} steps", config.steps_up);
    bench.sim.set(Pin::Up, H)?;
    bench.sim.set(Pin::En, H)?;
    bench.sim.rising_edges(config.steps_up)?;
    let expect_up = val + config.steps_up;
    bench.expect_count("count up", expect_up)?;

    info!("count down {} steps", config.steps_down);
    bench.sim.set(Pin::Up, L)?;
    bench.sim.rising_edges(config.steps_down)?;
    let expect_down = expect_up - config.steps_down;
    bench.expect_count("count down", expect_down)?;

    info!("tri-state output");
    bench.sim.set(Pin::Oe, L)?;
    bench.sim.expect_oeb(0xFF_u8)?;
    let bus = bench.sim.expect_bus(TriBus::high_z())?;
    bench.check("oe low", bus);

    bench.sim.set(Pin::Oe, H)?;
    bench.sim.expect_oeb(0x00_u8)?;
    let bus = bench.sim.expect_bus(TriBus::driven(expect_down))?;
    bench.check("oe high", bus);

    bench.sim.rising_edge()?;
    bench.expect_count("still counting", expect_down - 1_u8)?;

    bench.report.end_time = bench.sim.time();
    bench.sim.finish()?;

    Ok(bench.report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = BenchConfig::from_json("{}").unwrap();
        assert_eq!(config, BenchConfig::default());

        let config = BenchConfig::from_json(r#"{ "load_value": 255, "steps_up": 1 }"#).unwrap();
        assert_eq!(config.load_value, 0xFF);
        assert_eq!(config.steps_up, 1);
        assert_eq!(config.steps_down, 9);
    }

    #[test]
    fn config_rejects_unknown_fields() {
        assert!(BenchConfig::from_json(r#"{ "load": 1 }"#).is_err());
        assert!(BenchConfig::from_json(r#"{ "load_value": 256 }"#).is_err());
    }

    #[test]
    fn reset_cycles_overflow() {
        let config = BenchConfig {
            reset_cycles: 1_000_000_000_000_000,
            ..BenchConfig::default()
        };
        assert!(matches!(run(&config), Err(Error::InvalidConfig {
            field: "reset_cycles",
            ..
        })));

        let cycles = u64::MAX / CountDom::PERIOD;
        let config = BenchConfig {
            reset_cycles: cycles,
            ..BenchConfig::default()
        };
        assert_eq!(config.reset_time().unwrap(), cycles * CountDom::PERIOD);
    }

    #[test]
    fn default_scenario() {
        let report = run(&BenchConfig::default()).unwrap();
        let checks = report
            .checks
            .iter()
            .map(|check| (check.name, check.value.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(checks, [
            ("reset", "0x00"),
            ("load", "0xa5"),
            ("count up", "0xaa"),
            ("count down", "0xa1"),
            ("oe low", "zzzzzzzz"),
            ("oe high", "10100001"),
            ("still counting", "0xa0"),
        ]);
    }
}
