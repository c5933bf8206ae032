//! Tri-state logic for output buses.
//!
//! A bus bit is either driven to a defined level or released (high
//! impedance). Released bits never read as `0` or `1`.

use std::{
    fmt::{self, Debug, Display},
    ops::Index,
};

use crate::{bit::Bit, unsigned::Unsigned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logic {
    Driven(Bit),
    HighZ,
}

impl Logic {
    #[inline]
    pub fn is_driven(self) -> bool {
        matches!(self, Self::Driven(_))
    }

    #[inline]
    pub fn is_high_z(self) -> bool {
        matches!(self, Self::HighZ)
    }

    #[inline]
    pub fn driven(self) -> Option<Bit> {
        match self {
            Self::Driven(bit) => Some(bit),
            Self::HighZ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Driven(bit) if bit.is_high() => '1',
            Self::Driven(_) => '0',
            Self::HighZ => 'z',
        }
    }
}

impl From<Bit> for Logic {
    fn from(bit: Bit) -> Self {
        Self::Driven(bit)
    }
}

impl Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// `N` tri-state bits, index 0 is the least significant bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriBus<const N: usize>([Logic; N]);

impl<const N: usize> TriBus<N> {
    pub fn high_z() -> Self {
        Self([Logic::HighZ; N])
    }

    pub fn driven(value: Unsigned<N>) -> Self {
        let mut bits = [Logic::HighZ; N];
        for (logic, bit) in bits.iter_mut().zip(value.bits()) {
            *logic = Logic::Driven(bit);
        }
        Self(bits)
    }

    /// Drives `value` when `oe` is high, releases every bit otherwise.
    pub fn drive(value: Unsigned<N>, oe: Bit) -> Self {
        match oe.is_high() {
            true => Self::driven(value),
            false => Self::high_z(),
        }
    }

    /// `None` as soon as one bit is released.
    pub fn value(&self) -> Option<Unsigned<N>> {
        self.0
            .iter()
            .enumerate()
            .try_fold(Unsigned::<N>::ZERO, |acc, (idx, logic)| {
                logic.driven().map(|bit| acc.set_bit(idx, bit))
            })
    }

    /// Output-enable-bar view: bit `i` is set iff bit `i` is released.
    pub fn oeb(&self) -> Unsigned<N> {
        self.0
            .iter()
            .enumerate()
            .fold(Unsigned::<N>::ZERO, |acc, (idx, logic)| {
                acc.set_bit(idx, logic.is_high_z().into())
            })
    }

    pub fn is_high_z(&self) -> bool {
        self.0.iter().all(|logic| logic.is_high_z())
    }

    pub fn is_driven(&self) -> bool {
        self.0.iter().all(|logic| logic.is_driven())
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Logic> + '_ {
        self.0.iter().copied()
    }
}

impl<const N: usize> Index<usize> for TriBus<N> {
    type Output = Logic;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.0[idx]
    }
}

impl<const N: usize> Display for TriBus<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for logic in self.0.iter().rev() {
            write!(f, "{logic}")?;
        }
        Ok(())
    }
}

impl<const N: usize> Debug for TriBus<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriBus({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bit::{H, L},
        unsigned::U8,
    };

    #[test]
    fn drive() {
        let bus = TriBus::drive(U8::new(0xA1), H);
        assert!(bus.is_driven());
        assert_eq!(bus.value(), Some(U8::new(0xA1)));
        assert_eq!(bus.oeb(), 0_u8);
        assert_eq!(bus[0], Logic::Driven(H));
        assert_eq!(bus[1], Logic::Driven(L));
        assert_eq!(bus.to_string(), "10100001");
    }

    #[test]
    fn release() {
        let bus = TriBus::drive(U8::new(0xA1), L);
        assert!(bus.is_high_z());
        assert_eq!(bus.value(), None);
        assert_eq!(bus.oeb(), 0xFF_u8);
        assert_eq!(bus.to_string(), "zzzzzzzz");
    }

    #[test]
    fn partial() {
        let mut bus = TriBus::<4>::driven(Unsigned::new(0b0110));
        bus.0[3] = Logic::HighZ;
        assert!(!bus.is_driven());
        assert!(!bus.is_high_z());
        assert_eq!(bus.value(), None);
        assert_eq!(bus.oeb(), 0b1000_u8);
        assert_eq!(bus.to_string(), "z110");
    }
}
