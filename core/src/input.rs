use core::ops::{BitOr, BitOrAssign};

use log::trace;

/// Re-sample budget of the press debounce. Spans a few milliseconds on the
/// ARM9 at its boot clock.
pub const DEBOUNCE_ITERATIONS: u32 = 0x13000;

/// Console keys, numbered by their bit in the HID pad register.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buttons {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
    R,
    L,
    X,
    Y,
}

/// Set of keys held down at one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyMask(u32);

impl KeyMask {
    pub const fn empty() -> Self {
        KeyMask(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        KeyMask(bits & 0xFFF)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, button: Buttons) -> bool {
        let mask = 1 << (button as u32);
        (self.0 & mask) != 0
    }

    pub const fn intersects(self, other: KeyMask) -> bool {
        (self.0 & other.0) != 0
    }

    pub const fn with(self, button: Buttons) -> Self {
        KeyMask(self.0 | (1 << (button as u32)))
    }
}

impl From<Buttons> for KeyMask {
    fn from(button: Buttons) -> Self {
        KeyMask::empty().with(button)
    }
}

impl BitOr for KeyMask {
    type Output = KeyMask;

    fn bitor(self, rhs: KeyMask) -> KeyMask {
        KeyMask(self.0 | rhs.0)
    }
}

impl BitOr<Buttons> for KeyMask {
    type Output = KeyMask;

    fn bitor(self, rhs: Buttons) -> KeyMask {
        self.with(rhs)
    }
}

impl BitOrAssign<Buttons> for KeyMask {
    fn bitor_assign(&mut self, rhs: Buttons) {
        *self = self.with(rhs);
    }
}

/// Raw, undebounced key state.
pub trait KeySource {
    fn sample(&mut self) -> KeyMask;
}

impl<K: KeySource + ?Sized> KeySource for &mut K {
    fn sample(&mut self) -> KeyMask {
        (**self).sample()
    }
}

/// Debounced blocking reader on top of a [`KeySource`].
///
/// Every wait here busy-polls the source and never yields: there is nothing
/// else running on the processor while a screen waits for the user. None of
/// the waits time out.
pub struct InputReader<K> {
    source: K,
    debounce: u32,
}

impl<K: KeySource> InputReader<K> {
    pub fn new(source: K) -> Self {
        Self::with_debounce(source, DEBOUNCE_ITERATIONS)
    }

    /// `debounce` is the number of identical re-samples a press needs before
    /// it is accepted. Zero accepts the first non-empty sample.
    pub fn with_debounce(source: K, debounce: u32) -> Self {
        InputReader { source, debounce }
    }

    /// Block until no key is held.
    pub fn wait_for_release(&mut self) {
        while !self.source.sample().is_empty() {}
    }

    /// Block until a key mask has been held unchanged for the whole debounce
    /// window and return it.
    ///
    /// Keys still held from a previous screen are ignored: the source must
    /// report an empty mask before any press counts. A mask that changes
    /// during the window is treated as noise and the wait starts over.
    pub fn wait_for_confirmed_key(&mut self) -> KeyMask {
        self.wait_for_release();

        loop {
            let key = self.wait_for_press();
            if self.is_stable(key) {
                trace!("Confirmed key mask: {:012b}", key.bits());
                return key;
            }
            trace!("Key mask {:012b} bounced, waiting again", key.bits());
        }
    }

    fn wait_for_press(&mut self) -> KeyMask {
        loop {
            let key = self.source.sample();
            if !key.is_empty() {
                return key;
            }
        }
    }

    fn is_stable(&mut self, key: KeyMask) -> bool {
        (0..self.debounce).all(|_| self.source.sample() == key)
    }
}
