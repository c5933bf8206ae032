use std::{
    fmt::{self, Binary, Debug, Display, LowerHex, UpperHex},
    ops::{
        Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not,
        Shl, Shr, Sub, SubAssign,
    },
};

use paste::paste;

use crate::{
    bit::Bit,
    cast::{Cast, CastFrom},
};

pub const fn unsigned_value(val: u128, width: usize) -> u128 {
    if width >= 128 {
        val
    } else {
        val & ((1 << width) - 1)
    }
}

/// Fixed-width unsigned value. Every operation wraps modulo `2^N`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Unsigned<const N: usize>(u128);

pub type U8 = Unsigned<8>;

#[inline]
pub const fn u<const N: usize>(val: u128) -> Unsigned<N> {
    Unsigned::new(val)
}

impl<const N: usize> Unsigned<N> {
    const VALID_WIDTH: () = assert!(N >= 1 && N <= 128, "width must be in 1..=128");

    pub const WIDTH: usize = N;
    pub const MAX: Self = Self(unsigned_value(u128::MAX, N));
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn new(val: u128) -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::VALID_WIDTH;
        Self(unsigned_value(val, N))
    }

    #[inline]
    pub const fn value(self) -> u128 {
        self.0
    }

    pub fn bit(self, idx: usize) -> Bit {
        assert!(idx < N, "bit index {idx} out of range for width {N}");
        Bit::from_u128((self.0 >> idx) & 1)
    }

    pub fn set_bit(self, idx: usize, bit: Bit) -> Self {
        assert!(idx < N, "bit index {idx} out of range for width {N}");
        let mask = 1_u128 << idx;
        match bit.is_high() {
            true => Self(self.0 | mask),
            false => Self(self.0 & !mask),
        }
    }

    #[inline]
    pub fn msb(self) -> Bit {
        self.bit(N - 1)
    }

    #[inline]
    pub fn lsb(self) -> Bit {
        self.bit(0)
    }

    /// Bits from the least significant one.
    pub fn bits(self) -> impl DoubleEndedIterator<Item = Bit> + ExactSizeIterator {
        (0..N).map(move |idx| self.bit(idx))
    }
}

macro_rules! impl_for_unsigned_prim_ty {
    ($( $prim:ty ),+) => {
        $(
            impl<const N: usize> CastFrom<$prim> for Unsigned<N> {
                #[inline]
                fn cast_from(val: $prim) -> Self {
                    Self::new(val as u128)
                }
            }

            impl<const N: usize> CastFrom<Unsigned<N>> for $prim {
                #[inline]
                fn cast_from(val: Unsigned<N>) -> Self {
                    val.0 as $prim
                }
            }

            impl<const N: usize> From<$prim> for Unsigned<N> {
                #[inline]
                fn from(val: $prim) -> Self {
                    val.cast()
                }
            }

            impl<const N: usize> PartialEq<$prim> for Unsigned<N> {
                #[inline]
                fn eq(&self, other: &$prim) -> bool {
                    self.0 == *other as u128
                }
            }

            impl<const N: usize> PartialEq<Unsigned<N>> for $prim {
                #[inline]
                fn eq(&self, other: &Unsigned<N>) -> bool {
                    other.eq(self)
                }
            }
        )+
    };
}

impl_for_unsigned_prim_ty!(u8, u16, u32, u64, u128, usize);

impl<const N: usize, const M: usize> CastFrom<Unsigned<M>> for Unsigned<N> {
    fn cast_from(from: Unsigned<M>) -> Unsigned<N> {
        Self::new(from.0)
    }
}

impl<const N: usize> Display for Unsigned<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<const N: usize> Debug for Unsigned<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}({})", N, self.0)
    }
}

impl<const N: usize> Binary for Unsigned<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Binary::fmt(&self.0, f)
    }
}

impl<const N: usize> LowerHex for Unsigned<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        LowerHex::fmt(&self.0, f)
    }
}

impl<const N: usize> UpperHex for Unsigned<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        UpperHex::fmt(&self.0, f)
    }
}

macro_rules! impl_op {
    ($trait:ident => $method:ident => $op:ident) => {
        impl<const N: usize> $trait for Unsigned<N> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self::Output {
                Self::new(self.0.$op(rhs.0))
            }
        }
    };
}

macro_rules! impl_ops_for_prim {
    ( $trait:ident => $method:ident => $op:ident => $( $prim:ty ),+) => {
        $(
            impl<const N: usize> $trait<$prim> for Unsigned<N> {
                type Output = Unsigned<N>;

                #[inline]
                fn $method(self, rhs: $prim) -> Self::Output {
                    self.$method(Unsigned::<N>::cast_from(rhs))
                }
            }
        )+
    };
}

macro_rules! impl_ops {
    ($( $trait:ident => $method:ident => $op:ident ),+) => {
        paste! {
            $(
                impl_op!($trait => $method => $op);

                impl_ops_for_prim!($trait => $method => $op =>
                    u8, u16, u32, u64, u128, usize
                );

                impl<const N: usize, R> [<$trait Assign>]<R> for Unsigned<N>
                where
                    Unsigned<N>: $trait<R, Output = Unsigned<N>>,
                {
                    #[inline]
                    fn [<$method _assign>](&mut self, rhs: R) {
                        *self = (*self).$method(rhs);
                    }
                }
            )+
        }
    };
}

impl_ops!(
    BitAnd => bitand => bitand,
    BitOr => bitor => bitor,
    BitXor => bitxor => bitxor,
    Add => add => wrapping_add,
    Sub => sub => wrapping_sub
);

macro_rules! impl_shift_ops {
    ($( $prim:ty ),+) => {
        $(
            impl<const N: usize> Shl<$prim> for Unsigned<N> {
                type Output = Self;

                fn shl(self, rhs: $prim) -> Self::Output {
                    match self.0.checked_shl(rhs as u32) {
                        Some(val) if (rhs as usize) < N => Self::new(val),
                        _ => Self::ZERO,
                    }
                }
            }

            impl<const N: usize> Shr<$prim> for Unsigned<N> {
                type Output = Self;

                fn shr(self, rhs: $prim) -> Self::Output {
                    match self.0.checked_shr(rhs as u32) {
                        Some(val) if (rhs as usize) < N => Self::new(val),
                        _ => Self::ZERO,
                    }
                }
            }
        )+
    };
}

impl_shift_ops!(u32, usize);

impl<const N: usize> Not for Unsigned<N> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::new(!self.0)
    }
}
