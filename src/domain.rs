use std::{
    cell::Cell,
    fmt::{self, Display},
    marker::PhantomData,
};

use derive_where::derive_where;

use crate::bit::Bit;

pub const SECOND: u64 = 1_000_000_000_000;
pub const MILLISECOND: u64 = 1_000_000_000;
pub const MICROSECOND: u64 = 1_000_000;
pub const NANOSECOND: u64 = 1_000;
pub const PICOSECOND: u64 = 1;

pub const fn hz_to_period(freq: u64) -> u64 {
    assert!(freq > 0 && SECOND >= freq);
    SECOND / freq
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Sync,
    Async,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Whether a raw signal level asserts a signal of this polarity.
    #[inline]
    pub fn is_active(&self, level: Bit) -> bool {
        match self {
            Self::ActiveHigh => level.is_high(),
            Self::ActiveLow => level.is_low(),
        }
    }
}

pub trait ClockDomain: 'static {
    /// In hertz
    const FREQ: u64;
    /// In picoseconds
    const PERIOD: u64 = hz_to_period(Self::FREQ);
    /// Async/Sync reset
    const RESET_KIND: SyncKind;
    /// Reset Polarity
    const RESET_POLARITY: Polarity;
}

/// Primary clock of the counter: 50 MHz, asynchronous active-low reset.
pub struct CountDom;

impl ClockDomain for CountDom {
    const FREQ: u64 = 50_000_000;
    const RESET_KIND: SyncKind = SyncKind::Async;
    const RESET_POLARITY: Polarity = Polarity::ActiveLow;
}

/// Serial shift clock: 25 MHz, not related to [`CountDom`].
pub struct ShiftDom;

impl ClockDomain for ShiftDom {
    const FREQ: u64 = 25_000_000;
    const RESET_KIND: SyncKind = SyncKind::Async;
    const RESET_POLARITY: Polarity = Polarity::ActiveLow;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockState {
    Rising,
    High,
    Falling,
    Low,
}

impl Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rising => "rising",
            Self::High => "high",
            Self::Falling => "falling",
            Self::Low => "low",
        })
    }
}

/// Clock line of domain `D`.
///
/// An edge stays pending from `set` until `settle`, so that every
/// register evaluated in between observes the same edge exactly once.
#[derive_where(Debug, Clone)]
pub struct Clock<D: ClockDomain> {
    state: Cell<ClockState>,
    #[derive_where(skip)]
    _dom: PhantomData<D>,
}

impl<D: ClockDomain> Display for Clock<D> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.get().fmt(f)
    }
}

impl<D: ClockDomain> Default for Clock<D> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<D: ClockDomain> Clock<D> {
    pub fn new() -> Self {
        Self {
            state: Cell::new(ClockState::Low),
            _dom: PhantomData,
        }
    }

    #[inline]
    pub fn level(&self) -> Bit {
        matches!(self.state.get(), ClockState::Rising | ClockState::High).into()
    }

    #[inline]
    pub fn is_rising(&self) -> bool {
        matches!(self.state.get(), ClockState::Rising)
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        matches!(self.state.get(), ClockState::Falling)
    }

    /// Drives the clock line. Returns `true` if the level changed.
    pub fn set(&self, level: Bit) -> bool {
        if self.level() == level {
            return false;
        }

        self.state.set(match level.is_high() {
            true => ClockState::Rising,
            false => ClockState::Falling,
        });
        true
    }

    pub fn invert(&self) {
        self.set(!self.level());
    }

    pub fn settle(&self) {
        self.state.set(match self.state.get() {
            ClockState::Rising | ClockState::High => ClockState::High,
            ClockState::Falling | ClockState::Low => ClockState::Low,
        });
    }
}

pub struct TestDomain<const FREQ: u64>;

impl<const FREQ: u64> ClockDomain for TestDomain<FREQ> {
    const FREQ: u64 = FREQ;
    const RESET_KIND: SyncKind = SyncKind::Sync;
    const RESET_POLARITY: Polarity = Polarity::ActiveHigh;
}

pub type TD4 = TestDomain<4>;
