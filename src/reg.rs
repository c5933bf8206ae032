use std::marker::PhantomData;

use derive_where::derive_where;

use crate::{
    bit::Bit,
    domain::{Clock, ClockDomain, SyncKind},
};

/// A clocked process: owns its registers and updates them from its
/// inputs on the edges of one clock.
pub trait Module {
    type Domain: ClockDomain;
    type Input;
    type Output;

    fn logic(&mut self, clk: &Clock<Self::Domain>, input: Self::Input) -> Self::Output;
}

/// A D flip-flop bank in domain `D`.
#[derive_where(Debug, Clone; T)]
pub struct Reg<D: ClockDomain, T: Clone> {
    val: T,
    init_val: T,
    #[derive_where(skip)]
    _dom: PhantomData<D>,
}

impl<D: ClockDomain, T: Clone + Default> Default for Reg<D, T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<D: ClockDomain, T: Clone> Reg<D, T> {
    pub fn new(init_val: T) -> Self {
        Self {
            val: init_val.clone(),
            init_val,
            _dom: PhantomData,
        }
    }

    #[inline]
    pub fn value(&self) -> T {
        self.val.clone()
    }

    /// Resolves a raw reset level against the polarity of `D`.
    #[inline]
    pub fn is_reset(rst: Bit) -> bool {
        D::RESET_POLARITY.is_active(rst)
    }

    /// Applies one evaluation of the flip-flop.
    ///
    /// `rst` is the raw reset level. Returns the value held after the
    /// evaluation.
    pub fn reg_en(
        &mut self,
        clk: &Clock<D>,
        rst: Bit,
        en: bool,
        f: impl FnOnce(T) -> T,
    ) -> T {
        let rst = Self::is_reset(rst);
        match D::RESET_KIND {
            SyncKind::Sync => {
                if clk.is_rising() {
                    if rst {
                        self.val = self.init_val.clone();
                    } else if en {
                        self.val = f(self.val.clone());
                    }
                }
            }
            SyncKind::Async => {
                if rst {
                    self.val = self.init_val.clone();
                } else if clk.is_rising() && en {
                    self.val = f(self.val.clone());
                }
            }
        }

        self.val.clone()
    }

    #[inline]
    pub fn reg(&mut self, clk: &Clock<D>, rst: Bit, f: impl FnOnce(T) -> T) -> T {
        self.reg_en(clk, rst, true, f)
    }
}
