use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use derive_where::derive_where;
use rustc_hash::FxHashMap;
use strum::IntoEnumIterator;
use vcd::{IdCode, TimescaleUnit, Value as TraceValue, VarType, Writer as VcdWriter};

use crate::{
    bit::Bit,
    logic::{Logic, TriBus},
    top::{Pin, ProgCounter},
    unsigned::Unsigned,
};

#[derive(Debug, Clone, Copy)]
pub enum Timescale {
    S(u32),
    MS(u32),
    US(u32),
    NS(u32),
    PS(u32),
    FS(u32),
}

impl Timescale {
    fn into_pair(self) -> (u32, TimescaleUnit) {
        match self {
            Self::S(ts) => (ts, TimescaleUnit::S),
            Self::MS(ts) => (ts, TimescaleUnit::MS),
            Self::US(ts) => (ts, TimescaleUnit::US),
            Self::NS(ts) => (ts, TimescaleUnit::NS),
            Self::PS(ts) => (ts, TimescaleUnit::PS),
            Self::FS(ts) => (ts, TimescaleUnit::FS),
        }
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Self::PS(1)
    }
}

#[inline]
fn bit_to_vcd(bit: Bit) -> TraceValue {
    match bit.is_high() {
        true => TraceValue::V1,
        false => TraceValue::V0,
    }
}

#[inline]
fn logic_to_vcd(logic: Logic) -> TraceValue {
    match logic {
        Logic::Driven(bit) => bit_to_vcd(bit),
        Logic::HighZ => TraceValue::Z,
    }
}

/// Last dumped values, compared against on every dump.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    pins: [Bit; 8],
    count: Unsigned<8>,
    shift_reg: Unsigned<8>,
    bus: TriBus<8>,
}

impl Snapshot {
    fn take(dut: &ProgCounter) -> Self {
        let mut pins = [Bit::default(); 8];
        for pin in Pin::iter() {
            pins[pin.idx()] = dut.pin(pin);
        }

        Self {
            pins,
            count: dut.count_out(),
            shift_reg: dut.shift_reg(),
            bus: dut.bus_out(),
        }
    }
}

/// Writes the counter's ports and registers into a VCD file.
#[derive_where(Debug)]
pub struct Tracer {
    syms: FxHashMap<&'static str, IdCode>,
    mod_name: &'static str,
    timescale: Timescale,
    last: Option<Snapshot>,
    last_time: Option<u64>,
    #[derive_where(skip)]
    vcd: VcdWriter<Box<dyn Write>>,
}

impl Tracer {
    pub fn create<P: AsRef<Path>>(
        path: P,
        mod_name: &'static str,
        timescale: Option<Timescale>,
    ) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Self::new(file, mod_name, timescale)
    }

    pub fn new(
        writer: impl Write + 'static,
        mod_name: &'static str,
        timescale: Option<Timescale>,
    ) -> io::Result<Self> {
        let mut vcd = VcdWriter::new(Box::new(writer) as Box<dyn Write>);
        let timescale = timescale.unwrap_or_default();
        let (ts, unit) = timescale.into_pair();
        vcd.timescale(ts, unit)?;
        vcd.add_module(mod_name)?;

        let mut syms: FxHashMap<&'static str, IdCode> = Default::default();
        for pin in Pin::iter() {
            let code = vcd.add_var(VarType::Wire, 1, pin.name(), None)?;
            syms.insert(pin.name(), code);
        }
        for (sym, ty) in [
            ("count_out", VarType::Reg),
            ("shift_reg", VarType::Reg),
            ("bus_out", VarType::Wire),
        ] {
            let code = vcd.add_var(ty, 8, sym, None)?;
            syms.insert(sym, code);
        }

        vcd.upscope()?;
        vcd.enddefinitions()?;

        Ok(Self {
            syms,
            mod_name,
            timescale,
            last: None,
            last_time: None,
            vcd,
        })
    }

    #[inline]
    pub fn mod_name(&self) -> &'static str {
        self.mod_name
    }

    #[inline]
    pub fn timescale(&self) -> Timescale {
        self.timescale
    }

    /// Dumps every value that changed since the previous call.
    pub fn dump(&mut self, time: u64, dut: &ProgCounter) -> io::Result<()> {
        let snapshot = Snapshot::take(dut);
        if self.last.as_ref() == Some(&snapshot) {
            return Ok(());
        }

        if self.last_time != Some(time) {
            self.vcd.timestamp(time)?;
            self.last_time = Some(time);
        }

        let last = self.last.take();
        for pin in Pin::iter() {
            let level = snapshot.pins[pin.idx()];
            if last.as_ref().map(|last| last.pins[pin.idx()]) != Some(level) {
                self.change_wire(pin.name(), bit_to_vcd(level))?;
            }
        }

        if last.as_ref().map(|last| last.count) != Some(snapshot.count) {
            self.change_bus("count_out", snapshot.count.bits().rev().map(bit_to_vcd))?;
        }
        if last.as_ref().map(|last| last.shift_reg) != Some(snapshot.shift_reg) {
            self.change_bus(
                "shift_reg",
                snapshot.shift_reg.bits().rev().map(bit_to_vcd),
            )?;
        }
        if last.as_ref().map(|last| last.bus) != Some(snapshot.bus) {
            self.change_bus("bus_out", snapshot.bus.iter().rev().map(logic_to_vcd))?;
        }

        self.last = Some(snapshot);
        Ok(())
    }

    fn change_wire(&mut self, sym: &'static str, value: TraceValue) -> io::Result<()> {
        if let Some(id) = self.syms.get(sym) {
            self.vcd.change_scalar(*id, value)?;
        }
        Ok(())
    }

    fn change_bus(
        &mut self,
        sym: &'static str,
        values: impl IntoIterator<Item = TraceValue>,
    ) -> io::Result<()> {
        if let Some(id) = self.syms.get(sym) {
            self.vcd.change_vector(*id, values)?;
        }
        Ok(())
    }

    #[inline]
    pub fn flush(&mut self) -> io::Result<()> {
        self.vcd.flush()
    }
}
