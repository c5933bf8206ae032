use std::{
    fmt::{self, Binary, Debug, Display},
    ops::{BitAnd, BitOr, BitXor, Not},
};

use crate::cast::CastFrom;

#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Bit(bool);

pub const H: Bit = Bit(true);
pub const L: Bit = Bit(false);

impl Bit {
    #[inline]
    pub const fn new(value: bool) -> Self {
        Self(value)
    }

    pub(crate) const fn from_u128(value: u128) -> Self {
        Self(value > 0)
    }

    #[inline]
    pub const fn is_high(self) -> bool {
        self.0
    }

    #[inline]
    pub const fn is_low(self) -> bool {
        !self.0
    }

    #[inline]
    pub const fn as_u128(self) -> u128 {
        match self.0 {
            false => 0,
            true => 1,
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Bit {
        Bit(value)
    }
}

impl From<Bit> for bool {
    fn from(bit: Bit) -> Self {
        bit.0
    }
}

impl CastFrom<bool> for Bit {
    #[inline]
    fn cast_from(value: bool) -> Self {
        Self(value)
    }
}

impl CastFrom<Bit> for bool {
    #[inline]
    fn cast_from(bit: Bit) -> Self {
        bit.0
    }
}

impl CastFrom<Bit> for u8 {
    #[inline]
    fn cast_from(bit: Bit) -> Self {
        bit.as_u128() as u8
    }
}

impl Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self.0 {
            true => "H",
            false => "L",
        })
    }
}

impl Debug for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Binary for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u128())
    }
}

impl Not for Bit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from(!self.0)
    }
}

macro_rules! impl_bit_op {
    ($( $trait:ident :: $method:ident => $op:tt ),+) => {
        $(
            impl $trait for Bit {
                type Output = Self;

                fn $method(self, rhs: Self) -> Self::Output {
                    Self::from(self.0 $op rhs.0)
                }
            }

            impl $trait<bool> for Bit {
                type Output = Self;

                fn $method(self, rhs: bool) -> Self::Output {
                    Self::from(self.0 $op rhs)
                }
            }

            impl $trait<Bit> for bool {
                type Output = Bit;

                fn $method(self, rhs: Bit) -> Self::Output {
                    Bit::from(self $op rhs.0)
                }
            }
        )+
    };
}

impl_bit_op!(
    BitAnd::bitand => &,
    BitOr::bitor => |,
    BitXor::bitxor => ^
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops() {
        assert_eq!(!H, L);
        assert_eq!(H & L, L);
        assert_eq!(H | L, H);
        assert_eq!(H ^ H, L);
        assert_eq!(true & H, H);
        assert_eq!(L | false, L);
    }

    #[test]
    fn fmt() {
        assert_eq!(format!("{H} {L}"), "H L");
        assert_eq!(format!("{:b}{:b}", H, L), "10");
    }
}
