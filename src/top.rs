use std::fmt::{self, Display};

use strum::{
    Display as StrumDisplay, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr,
};
use tracing::trace;

use crate::{
    bit::{Bit, H, L},
    counter::{Counter, CounterInput},
    domain::{Clock, CountDom, ShiftDom},
    loader::{LoaderInput, ShiftLoader},
    logic::TriBus,
    reg::Module,
    unsigned::U8,
};

/// Input pins of the counter. The discriminant is the bit position in
/// the packed `io_in` port.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    StrumDisplay,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Pin {
    Clk = 0,
    ArstN = 1,
    Load = 2,
    Oe = 3,
    Sdi = 4,
    Sclk = 5,
    Up = 6,
    En = 7,
}

impl Pin {
    #[inline]
    pub fn idx(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_clock(self) -> bool {
        matches!(self, Self::Clk | Self::Sclk)
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Levels of the non-clock input pins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pins {
    pub arst_n: Bit,
    pub load: Bit,
    pub oe: Bit,
    pub sdi: Bit,
    pub up: Bit,
    pub en: Bit,
}

/// Power-on state: every input low, so reset is asserted and the bus is
/// released.
#[derive(Debug, Clone, Default)]
pub struct ProgCounter {
    clk: Clock<CountDom>,
    sclk: Clock<ShiftDom>,
    pins: Pins,
    loader: ShiftLoader,
    counter: Counter,
}

impl ProgCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&self, pin: Pin) -> Bit {
        match pin {
            Pin::Clk => self.clk.level(),
            Pin::ArstN => self.pins.arst_n,
            Pin::Load => self.pins.load,
            Pin::Oe => self.pins.oe,
            Pin::Sdi => self.pins.sdi,
            Pin::Sclk => self.sclk.level(),
            Pin::Up => self.pins.up,
            Pin::En => self.pins.en,
        }
    }

    #[inline]
    pub fn pins(&self) -> Pins {
        self.pins
    }

    /// Drives one input pin and re-evaluates the circuit.
    ///
    /// Returns `true` if the level changed.
    pub fn set(&mut self, pin: Pin, level: impl Into<Bit>) -> bool {
        let changed = self.drive(pin, level.into());
        if changed {
            self.eval();
        }
        changed
    }

    /// Drives all pins from a packed `io_in` byte.
    ///
    /// Level pins (`arst_n` included) settle first. Both clock pins then
    /// change in one evaluation step, so coincident edges are seen
    /// together.
    pub fn set_io_in(&mut self, io_in: U8) {
        let mut changed = false;
        for pin in Pin::iter().filter(|pin| !pin.is_clock()) {
            changed |= self.drive(pin, io_in.bit(pin.idx()));
        }
        if changed {
            self.eval();
        }

        let mut edges = false;
        for pin in [Pin::Clk, Pin::Sclk] {
            edges |= self.drive(pin, io_in.bit(pin.idx()));
        }
        if edges {
            self.eval();
        }
    }

    fn drive(&mut self, pin: Pin, level: Bit) -> bool {
        if self.pin(pin) == level {
            return false;
        }
        trace!("{pin} <- {level}");

        match pin {
            Pin::Clk => {
                self.clk.set(level);
            }
            Pin::Sclk => {
                self.sclk.set(level);
            }
            Pin::ArstN => self.pins.arst_n = level,
            Pin::Load => self.pins.load = level,
            Pin::Oe => self.pins.oe = level,
            Pin::Sdi => self.pins.sdi = level,
            Pin::Up => self.pins.up = level,
            Pin::En => self.pins.en = level,
        }
        true
    }

    pub fn io_in(&self) -> U8 {
        Pin::iter().fold(U8::ZERO, |acc, pin| acc.set_bit(pin.idx(), self.pin(pin)))
    }

    /// Evaluates both processes for the current pin levels and pending
    /// clock edges, then settles the edges. The shift register read by the
    /// counter is the value from before this step.
    fn eval(&mut self) {
        let loaded = self.loader.value();

        self.loader.logic(&self.sclk, LoaderInput {
            rst: self.pins.arst_n,
            sdi: self.pins.sdi,
        });
        self.counter.logic(&self.clk, CounterInput {
            rst: self.pins.arst_n,
            load: self.pins.load,
            up: self.pins.up,
            en: self.pins.en,
            loaded,
        });

        self.clk.settle();
        self.sclk.settle();
    }

    /// One full `clk` cycle: rising then falling edge.
    pub fn clock(&mut self) -> U8 {
        self.set(Pin::Clk, H);
        self.set(Pin::Clk, L);
        self.count_out()
    }

    /// One full `sclk` cycle with `sdi` driven to `bit`.
    pub fn shift(&mut self, bit: Bit) -> U8 {
        self.set(Pin::Sdi, bit);
        self.set(Pin::Sclk, H);
        self.set(Pin::Sclk, L);
        self.shift_reg()
    }

    /// Shifts `byte` in MSB first.
    pub fn shift_byte(&mut self, byte: U8) -> U8 {
        for bit in byte.bits().rev() {
            self.shift(bit);
        }
        self.shift_reg()
    }

    #[inline]
    pub fn count_out(&self) -> U8 {
        self.counter.value()
    }

    #[inline]
    pub fn shift_reg(&self) -> U8 {
        self.loader.value()
    }

    /// Tri-state output, follows `oe` without a clock edge.
    #[inline]
    pub fn bus_out(&self) -> TriBus<8> {
        TriBus::drive(self.count_out(), self.pins.oe)
    }

    #[inline]
    pub fn io_out(&self) -> U8 {
        self.count_out()
    }

    #[inline]
    pub fn io_oeb(&self) -> U8 {
        self.bus_out().oeb()
    }
}

impl Display for ProgCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count = {:#04x}, shift_reg = {:#04x}, bus = {}",
            self.count_out(),
            self.shift_reg(),
            self.bus_out()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn released() -> ProgCounter {
        let mut pc = ProgCounter::new();
        pc.set(Pin::ArstN, H);
        pc
    }

    #[test]
    fn pin_names() {
        assert_eq!(Pin::COUNT, 8);
        assert_eq!(Pin::ArstN.name(), "arst_n");
        assert_eq!(Pin::Sclk.to_string(), "sclk");
        assert_eq!("oe".parse::<Pin>().ok(), Some(Pin::Oe));
        assert_eq!(Pin::iter().map(Pin::idx).collect::<Vec<_>>(), [
            0, 1, 2, 3, 4, 5, 6, 7
        ]);
    }

    #[test]
    fn power_on() {
        let pc = ProgCounter::new();
        assert_eq!(pc.count_out(), 0_u8);
        assert_eq!(pc.shift_reg(), 0_u8);
        assert!(pc.bus_out().is_high_z());
        assert_eq!(pc.io_in(), 0_u8);
    }

    #[test]
    fn set_reports_change() {
        let mut pc = ProgCounter::new();
        assert!(pc.set(Pin::Oe, H));
        assert!(!pc.set(Pin::Oe, true));
        assert!(pc.set(Pin::Clk, H));
        assert!(!pc.set(Pin::Clk, H));
    }

    #[test]
    fn load_count_and_bus() {
        let mut pc = released();
        assert_eq!(pc.shift_byte(U8::new(0xA5)), 0xA5_u8);

        pc.set(Pin::Load, H);
        assert_eq!(pc.clock(), 0xA5_u8);
        pc.set(Pin::Load, L);

        pc.set(Pin::Up, H);
        pc.set(Pin::En, H);
        for _ in 0..5 {
            pc.clock();
        }
        assert_eq!(pc.count_out(), 0xAA_u8);

        pc.set(Pin::Up, L);
        for _ in 0..9 {
            pc.clock();
        }
        assert_eq!(pc.count_out(), 0xA1_u8);

        assert!(pc.bus_out().is_high_z());
        assert_eq!(pc.io_oeb(), 0xFF_u8);

        pc.set(Pin::Oe, H);
        assert_eq!(pc.bus_out().value(), Some(U8::new(0xA1)));
        assert_eq!(pc.io_oeb(), 0_u8);
        assert_eq!(pc.io_out(), 0xA1_u8);
    }

    #[test]
    fn reset_is_immediate_and_held() {
        let mut pc = released();
        pc.shift_byte(U8::new(0x0F));
        pc.set(Pin::Load, H);
        pc.clock();
        pc.set(Pin::Load, L);
        assert_eq!(pc.count_out(), 0x0F_u8);

        pc.set(Pin::En, H);
        pc.set(Pin::Up, H);
        pc.set(Pin::Clk, H);
        assert_eq!(pc.count_out(), 0x10_u8);

        // Clock is high, no edge: reset still acts at once.
        pc.set(Pin::ArstN, L);
        assert_eq!(pc.count_out(), 0_u8);
        assert_eq!(pc.shift_reg(), 0_u8);

        for _ in 0..3 {
            assert_eq!(pc.clock(), 0_u8);
        }
        assert_eq!(pc.shift(H), 0_u8);

        // Releasing reset alone does not count.
        pc.set(Pin::ArstN, H);
        assert_eq!(pc.count_out(), 0_u8);
        assert_eq!(pc.clock(), 1_u8);
    }

    #[test]
    fn coincident_edges_sample_old_shift_reg() {
        let mut pc = released();
        pc.shift_byte(U8::new(0x40));
        pc.set(Pin::Load, H);
        pc.set(Pin::Sdi, H);

        pc.set_io_in(pc.io_in().set_bit(Pin::Clk.idx(), H).set_bit(Pin::Sclk.idx(), H));
        assert_eq!(pc.count_out(), 0x40_u8);
        assert_eq!(pc.shift_reg(), 0x81_u8);
    }

    #[test]
    fn io_in_round_trip() {
        let mut pc = ProgCounter::new();
        // arst_n | oe | up | en
        let io_in = U8::new(0b1100_1010);
        pc.set_io_in(io_in);
        assert_eq!(pc.io_in(), io_in);
        assert_eq!(pc.pins(), Pins {
            arst_n: H,
            load: L,
            oe: H,
            sdi: L,
            up: H,
            en: H,
        });
        assert!(pc.bus_out().is_driven());
    }
}
