use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Zero or more events emitted by a single parse transition.
    ///
    /// The bit positions order events by scope and importance:
    /// `NEW_CELL < BYTE < END_RECORD < END < ERROR`. A consumer waiting
    /// for some event can therefore throw away everything below it (see
    /// [`Events::clear_until`]) without ever losing an event that matters
    /// more, such as the end of the stream or an error.
    #[derive(Clone, Copy, Eq, Hash, PartialEq)]
    pub struct Events: u8 {
        /// A new cell starts.
        const NEW_CELL = 1 << 0;
        /// The byte just consumed belongs to the current cell.
        const BYTE = 1 << 1;
        /// The current record has ended.
        const END_RECORD = 1 << 2;
        /// The stream has ended.
        const END = 1 << 3;
        /// The byte just consumed violates CSV grammar.
        const ERROR = 1 << 4;
    }
}

/// Event names in priority order, paired with their bits.
const NAMES: [(Events, &str); 5] = [
    (Events::NEW_CELL, "NewCell"),
    (Events::BYTE, "Byte"),
    (Events::END_RECORD, "EndRecord"),
    (Events::END, "End"),
    (Events::ERROR, "Error"),
];

impl Events {
    /// Returns the set containing only the lowest priority event in `self`.
    ///
    /// This is the event a consumer handling events in priority order sees
    /// next. If `self` is empty, then the empty set is returned.
    #[inline]
    pub const fn next(self) -> Events {
        let bits = self.bits();
        Events::from_bits_retain(bits & bits.wrapping_neg())
    }

    /// Remove every event in `other` from `self`.
    #[inline]
    pub fn clear(&mut self, other: Events) {
        self.remove(other);
    }

    /// Remove every event ranked strictly below the lowest event in `until`.
    ///
    /// The lowest event in `until` and everything above it is left alone.
    /// If `until` is empty, then nothing is removed.
    #[inline]
    pub fn clear_until(&mut self, until: Events) {
        let lowest = until.next().bits();
        if lowest == 0 {
            return;
        }
        let below = lowest - 1;
        *self = Events::from_bits_retain(self.bits() & !below);
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Events{}", self)
    }
}

impl fmt::Display for Events {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[")?;
        let mut first = true;
        for &(ev, name) in NAMES.iter() {
            if !self.contains(ev) {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        f.write_str("]")
    }
}
