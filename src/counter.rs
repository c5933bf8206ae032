use tracing::debug;

use crate::{
    bit::Bit,
    domain::{Clock, CountDom},
    reg::{Module, Reg},
    unsigned::U8,
};

#[derive(Debug, Clone, Copy)]
pub struct CounterInput {
    /// Raw `arst_n` level.
    pub rst: Bit,
    pub load: Bit,
    pub up: Bit,
    pub en: Bit,
    /// Shift register value sampled at this edge.
    pub loaded: U8,
}

/// What a rising edge does to the count register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load(U8),
    Inc,
    Dec,
    Hold,
}

impl Action {
    /// Load takes priority over counting.
    pub fn select(load: Bit, en: Bit, up: Bit, loaded: U8) -> Self {
        match (load.is_high(), en.is_high(), up.is_high()) {
            (true, _, _) => Self::Load(loaded),
            (false, true, true) => Self::Inc,
            (false, true, false) => Self::Dec,
            (false, false, _) => Self::Hold,
        }
    }

    pub fn apply(self, count: U8) -> U8 {
        match self {
            Self::Load(val) => val,
            Self::Inc => count + 1_u8,
            Self::Dec => count - 1_u8,
            Self::Hold => count,
        }
    }
}

/// The 8-bit up/down counter with synchronous parallel load.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    count: Reg<CountDom, U8>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn value(&self) -> U8 {
        self.count.value()
    }
}

impl Module for Counter {
    type Domain = CountDom;
    type Input = CounterInput;
    type Output = U8;

    fn logic(&mut self, clk: &Clock<CountDom>, input: CounterInput) -> U8 {
        let CounterInput {
            rst,
            load,
            up,
            en,
            loaded,
        } = input;

        let action = Action::select(load, en, up, loaded);
        let enabled = action != Action::Hold;
        let val = self.count.reg_en(clk, rst, enabled, |count| action.apply(count));

        if let Action::Load(_) = action {
            if clk.is_rising() && !Reg::<CountDom, U8>::is_reset(rst) {
                debug!("count <- shift_reg = {val:#04x}");
            }
        }
        val
    }
}
