//! Behavioral model of an 8-bit programmable counter.
//!
//! The counter has an asynchronous active-low reset, a serial load
//! register clocked by its own shift clock, synchronous up/down counting
//! and a tri-state output bus. [`top::ProgCounter`] is the circuit,
//! [`sim::Simulator`] drives it over simulated time.

pub mod bench;
pub mod bit;
pub mod cast;
pub mod counter;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logic;
pub mod reg;
pub mod sim;
pub mod top;
pub mod trace;
pub mod unsigned;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::{
        bench::{BenchConfig, Report},
        bit::{Bit, H, L},
        cast::{Cast, CastFrom},
        domain::{Clock, ClockDomain, CountDom, ShiftDom},
        logic::{Logic, TriBus},
        reg::{Module, Reg},
        sim::Simulator,
        top::{Pin, Pins, ProgCounter},
        trace::{Timescale, Tracer},
        unsigned::{u, Unsigned, U8},
    };
}
