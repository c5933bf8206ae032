//! Time-based driver for [`ProgCounter`].
//!
//! Drives the circuit the way an event-driven HDL simulator would: a
//! free-running clock generator on `clk`, pin changes at the current
//! simulation time, and waits on clock edges or fixed durations. Time is
//! counted in picoseconds.

use tracing::{debug, trace};

use crate::{
    bit::{Bit, H, L},
    domain::{ClockDomain, CountDom, ShiftDom},
    error::{Error, Result},
    logic::TriBus,
    top::{Pin, ProgCounter},
    trace::Tracer,
    unsigned::U8,
};

/// Free-running clock generator, starts high like a cocotb `Clock`.
#[derive(Debug, Clone, Copy)]
struct ClockGen {
    half_period: u64,
    next_toggle: u64,
    level: Bit,
}

impl ClockGen {
    fn new<D: ClockDomain>(now: u64) -> Self {
        Self {
            half_period: D::PERIOD / 2,
            next_toggle: now,
            level: L,
        }
    }

    fn toggle(&mut self) -> Result<Bit> {
        self.level = !self.level;
        self.next_toggle = self.next_toggle.checked_add(self.half_period).ok_or(
            Error::TimeOverflow {
                time: self.next_toggle,
                duration: self.half_period,
            },
        )?;
        Ok(self.level)
    }
}

#[derive(Debug)]
pub struct Simulator {
    dut: ProgCounter,
    time: u64,
    clk_gen: Option<ClockGen>,
    tracer: Option<Tracer>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(ProgCounter::new())
    }
}

impl Simulator {
    pub fn new(dut: ProgCounter) -> Self {
        Self {
            dut,
            time: 0,
            clk_gen: None,
            tracer: None,
        }
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    #[inline]
    pub fn dut(&self) -> &ProgCounter {
        &self.dut
    }

    /// Current simulation time in picoseconds.
    #[inline]
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Starts the `clk` generator; its first rising edge happens now.
    pub fn start_clock(&mut self) -> Result<()> {
        let mut clk_gen = ClockGen::new::<CountDom>(self.time);
        if self.dut.pin(Pin::Clk).is_high() {
            // Already high: the first toggle would be a falling edge.
            clk_gen.level = H;
        }
        debug!(
            "start clk at {} ps, period = {} ps",
            self.time,
            CountDom::PERIOD
        );
        self.clk_gen = Some(clk_gen);
        self.advance_to(self.time)
    }

    pub fn stop_clock(&mut self) {
        self.clk_gen = None;
    }

    #[inline]
    pub fn is_clock_running(&self) -> bool {
        self.clk_gen.is_some()
    }

    /// `clk` belongs to the generator while it runs.
    fn check_clk(&self, level: Bit) -> Result<()> {
        if self.is_clock_running() && self.dut.pin(Pin::Clk) != level {
            return Err(Error::PinDriven { pin: Pin::Clk });
        }
        Ok(())
    }

    pub fn set(&mut self, pin: Pin, level: impl Into<Bit>) -> Result<()> {
        let level = level.into();
        if pin == Pin::Clk {
            self.check_clk(level)?;
        }
        trace!("{} ps: {pin} = {level}", self.time);
        self.dut.set(pin, level);
        self.dump()
    }

    /// Drives the packed input port. While the clock generator runs, the
    /// `clk` bit must match the current `clk` level.
    pub fn set_io_in(&mut self, io_in: U8) -> Result<()> {
        self.check_clk(io_in.bit(Pin::Clk.idx()))?;
        trace!("{} ps: io_in = {io_in:#010b}", self.time);
        self.dut.set_io_in(io_in);
        self.dump()
    }

    /// Advances the time by `duration`, applying every generated clock
    /// toggle on the way (a toggle at the target time included).
    pub fn run_for(&mut self, duration: u64) -> Result<()> {
        let target = self
            .time
            .checked_add(duration)
            .ok_or(Error::TimeOverflow {
                time: self.time,
                duration,
            })?;
        self.advance_to(target)
    }

    fn advance_to(&mut self, target: u64) -> Result<()> {
        while let Some(clk_gen) = self.clk_gen.as_mut() {
            if clk_gen.next_toggle > target {
                break;
            }
            self.time = clk_gen.next_toggle;
            let level = clk_gen.toggle()?;
            self.dut.set(Pin::Clk, level);
            self.dump()?;
        }

        self.time = target;
        Ok(())
    }

    /// Waits for the next rising edge of `clk` and lets it act.
    pub fn rising_edge(&mut self) -> Result<()> {
        let clk_gen = self.clk_gen.as_ref().ok_or(Error::ClockStopped)?;
        let edge = match clk_gen.level.is_high() {
            true => clk_gen
                .next_toggle
                .checked_add(clk_gen.half_period)
                .ok_or(Error::TimeOverflow {
                    time: clk_gen.next_toggle,
                    duration: clk_gen.half_period,
                })?,
            false => clk_gen.next_toggle,
        };

        self.advance_to(edge)?;
        trace!("{} ps: rising clk, {}", self.time, self.dut);
        Ok(())
    }

    pub fn rising_edges(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.rising_edge()?;
        }
        Ok(())
    }

    /// Holds `pin` high for one `clk` edge, then low for one, `cycles`
    /// times.
    pub fn pulse(&mut self, pin: Pin, cycles: usize) -> Result<()> {
        for _ in 0..cycles {
            self.set(pin, H)?;
            self.rising_edge()?;
            self.set(pin, L)?;
            self.rising_edge()?;
        }
        Ok(())
    }

    /// Bit-bangs `byte` MSB first on `sdi`/`sclk`, half a shift clock
    /// period per phase. Leaves `sclk` low.
    pub fn shift_msb_first(&mut self, byte: U8) -> Result<()> {
        let half_period = ShiftDom::PERIOD / 2;
        for bit in byte.bits().rev() {
            self.set(Pin::Sdi, bit)?;
            self.set(Pin::Sclk, L)?;
            self.run_for(half_period)?;
            self.set(Pin::Sclk, H)?;
            self.run_for(half_period)?;
        }
        self.set(Pin::Sclk, L)?;
        debug!("{} ps: shifted in {byte:#04x}", self.time);
        Ok(())
    }

    fn mismatch(&self, signal: &'static str, expected: String, found: String) -> Error {
        Error::Mismatch {
            signal,
            expected,
            found,
            time: self.time,
        }
    }

    pub fn expect_count(&self, expected: impl Into<U8>) -> Result<U8> {
        let expected = expected.into();
        let found = self.dut.count_out();
        debug!("{} ps: expect count_out = {expected:#04x}, found {found:#04x}", self.time);
        if found != expected {
            return Err(self.mismatch(
                "count_out",
                format!("{expected:#04x}"),
                format!("{found:#04x}"),
            ));
        }
        Ok(found)
    }

    pub fn expect_oeb(&self, expected: impl Into<U8>) -> Result<U8> {
        let expected = expected.into();
        let found = self.dut.io_oeb();
        debug!("{} ps: expect io_oeb = {expected:#04x}, found {found:#04x}", self.time);
        if found != expected {
            return Err(self.mismatch(
                "io_oeb",
                format!("{expected:#04x}"),
                format!("{found:#04x}"),
            ));
        }
        Ok(found)
    }

    pub fn expect_bus(&self, expected: TriBus<8>) -> Result<TriBus<8>> {
        let found = self.dut.bus_out();
        debug!("{} ps: expect bus_out = {expected}, found {found}", self.time);
        if found != expected {
            return Err(self.mismatch("bus_out", expected.to_string(), found.to_string()));
        }
        Ok(found)
    }

    fn dump(&mut self) -> Result<()> {
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.dump(self.time, &self.dut)?;
        }
        Ok(())
    }

    /// Flushes the tracer and hands the circuit back.
    pub fn finish(mut self) -> Result<ProgCounter> {
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.flush()?;
        }
        Ok(self.dut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NANOSECOND;

    fn released() -> Simulator {
        let mut sim = Simulator::default();
        sim.set(Pin::ArstN, H).unwrap();
        sim
    }

    #[test]
    fn clock_generator_timing() {
        let mut sim = released();
        sim.set(Pin::En, H).unwrap();
        sim.set(Pin::Up, H).unwrap();

        sim.start_clock().unwrap();
        // First edge is at the start time.
        assert_eq!(sim.dut().count_out(), 1_u8);
        assert_eq!(sim.time(), 0);

        sim.rising_edge().unwrap();
        assert_eq!(sim.time(), 20 * NANOSECOND);
        assert_eq!(sim.dut().count_out(), 2_u8);

        sim.run_for(10 * NANOSECOND).unwrap();
        assert_eq!(sim.dut().pin(Pin::Clk), L);
        assert_eq!(sim.dut().count_out(), 2_u8);

        sim.run_for(10 * NANOSECOND).unwrap();
        assert_eq!(sim.time(), 40 * NANOSECOND);
        assert_eq!(sim.dut().count_out(), 3_u8);

        // Mid-period: the next edge is 20 ns away.
        sim.run_for(5 * NANOSECOND).unwrap();
        sim.rising_edge().unwrap();
        assert_eq!(sim.time(), 60 * NANOSECOND);
        assert_eq!(sim.dut().count_out(), 4_u8);
    }

    #[test]
    fn rising_edge_needs_clock() {
        let mut sim = released();
        assert!(matches!(sim.rising_edge(), Err(Error::ClockStopped)));

        sim.start_clock().unwrap();
        sim.stop_clock();
        assert!(!sim.is_clock_running());
        assert!(matches!(sim.rising_edge(), Err(Error::ClockStopped)));
    }

    #[test]
    fn shift_and_pulse_load() {
        let mut sim = released();
        sim.start_clock().unwrap();

        sim.shift_msb_first(U8::new(0x3C)).unwrap();
        assert_eq!(sim.time(), 8 * 40 * NANOSECOND);
        assert_eq!(sim.dut().shift_reg(), 0x3C_u8);
        assert_eq!(sim.dut().count_out(), 0_u8);

        sim.pulse(Pin::Load, 1).unwrap();
        assert_eq!(sim.expect_count(0x3C_u8).unwrap(), 0x3C_u8);
    }

    #[test]
    fn clk_is_owned_by_generator() {
        let mut sim = released();
        sim.set(Pin::En, H).unwrap();
        sim.set(Pin::Up, H).unwrap();
        sim.start_clock().unwrap();
        sim.run_for(10 * NANOSECOND).unwrap();
        assert_eq!(sim.dut().pin(Pin::Clk), L);
        assert_eq!(sim.dut().count_out(), 1_u8);

        assert!(matches!(
            sim.set(Pin::Clk, H),
            Err(Error::PinDriven { pin: Pin::Clk })
        ));
        assert!(matches!(
            sim.set_io_in(U8::new(0b1100_0011)),
            Err(Error::PinDriven { pin: Pin::Clk })
        ));
        // Same level is not a change.
        sim.set(Pin::Clk, L).unwrap();
        sim.set_io_in(U8::new(0b1100_0010)).unwrap();

        sim.rising_edge().unwrap();
        assert_eq!(sim.dut().count_out(), 2_u8);

        sim.stop_clock();
        sim.set(Pin::Clk, L).unwrap();
        sim.set(Pin::Clk, H).unwrap();
        assert_eq!(sim.dut().count_out(), 3_u8);
    }

    #[test]
    fn time_overflow() {
        let mut sim = released();
        sim.run_for(u64::MAX).unwrap();
        assert!(matches!(
            sim.run_for(1),
            Err(Error::TimeOverflow {
                time: u64::MAX,
                duration: 1
            })
        ));
        assert_eq!(sim.time(), u64::MAX);
    }

    #[test]
    fn mismatch_reports_signal() {
        let sim = released();
        let err = sim.expect_count(0x12_u8).unwrap_err();
        assert!(matches!(err, Error::Mismatch {
            signal: "count_out",
            ..
        }));
        assert_eq!(
            err.to_string(),
            "count_out mismatch at 0 ps (expected: 0x12, found: 0x00)"
        );

        assert!(sim.expect_oeb(0xFF_u8).is_ok());
        assert!(sim.expect_bus(TriBus::high_z()).is_ok());
        assert!(sim.expect_bus(TriBus::driven(U8::ZERO)).is_err());
    }
}
