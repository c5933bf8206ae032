use tracing::trace;

use crate::{
    bit::Bit,
    domain::{Clock, ShiftDom},
    reg::{Module, Reg},
    unsigned::U8,
};

#[derive(Debug, Clone, Copy)]
pub struct LoaderInput {
    /// Raw `arst_n` level.
    pub rst: Bit,
    pub sdi: Bit,
}

/// Serial-to-parallel front end. Shifts `sdi` in MSB first on every
/// rising edge of the shift clock.
#[derive(Debug, Clone, Default)]
pub struct ShiftLoader {
    shift_reg: Reg<ShiftDom, U8>,
}

impl ShiftLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn value(&self) -> U8 {
        self.shift_reg.value()
    }
}

impl Module for ShiftLoader {
    type Domain = ShiftDom;
    type Input = LoaderInput;
    type Output = U8;

    fn logic(&mut self, sclk: &Clock<ShiftDom>, LoaderInput { rst, sdi }: LoaderInput) -> U8 {
        let val = self
            .shift_reg
            .reg(sclk, rst, |val| (val << 1_usize) | U8::new(sdi.as_u128()));
        if sclk.is_rising() {
            trace!("shift_reg <- {sdi} = {val:#04x}");
        }
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit::{H, L};

    fn shift(loader: &mut ShiftLoader, sclk: &Clock<ShiftDom>, sdi: Bit) -> U8 {
        sclk.set(H);
        let val = loader.logic(sclk, LoaderInput { rst: H, sdi });
        sclk.settle();
        sclk.set(L);
        loader.logic(sclk, LoaderInput { rst: H, sdi: !sdi });
        sclk.settle();
        val
    }

    #[test]
    fn shift_msb_first() {
        let sclk = Clock::new();
        let mut loader = ShiftLoader::new();

        let vals = [H, L, H, L, L, H, L, H]
            .into_iter()
            .map(|sdi| shift(&mut loader, &sclk, sdi).value())
            .collect::<Vec<_>>();

        assert_eq!(vals, [0x01, 0x02, 0x05, 0x0A, 0x14, 0x29, 0x52, 0xA5]);
        assert_eq!(loader.value(), 0xA5_u8);
    }

    #[test]
    fn reset_clears() {
        let sclk = Clock::new();
        let mut loader = ShiftLoader::new();
        shift(&mut loader, &sclk, H);
        shift(&mut loader, &sclk, H);
        assert_eq!(loader.value(), 0x03_u8);

        assert_eq!(loader.logic(&sclk, LoaderInput { rst: L, sdi: H }), 0_u8);

        // Edges while in reset are ignored.
        sclk.set(H);
        assert_eq!(loader.logic(&sclk, LoaderInput { rst: L, sdi: H }), 0_u8);
    }
}
