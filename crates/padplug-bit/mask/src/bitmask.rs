use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::{Bitable, MAX_BITS};

/// Fixed-width set of [`Bitable`] elements, stored as a single `u16`.
///
/// The layout is `repr(transparent)`, so a mask can be passed by value
/// across an FFI boundary wherever a `u16` is expected.
#[repr(transparent)]
pub struct Bitmask<T: Bitable>(pub u16, PhantomData<T>);

impl<T: Bitable> Bitmask<T> {
    /// Create a new bitmask from a slice of values.
    pub fn new(values: &[T]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < values.len() {
            bits |= values[i].bit();
            i += 1;
        }
        Self(bits, PhantomData)
    }

    /// Create an empty bitmask.
    pub const fn empty() -> Self {
        Self(0, PhantomData)
    }

    /// Create a bitmask with every position of `T` set.
    pub const fn full() -> Self {
        if T::COUNT >= MAX_BITS {
            Self(u16::MAX, PhantomData)
        } else {
            Self((1u16 << T::COUNT) - 1, PhantomData)
        }
    }

    /// Create a new bitmask from a raw value.
    pub const fn from_value(value: u16) -> Self {
        Self(value, PhantomData)
    }

    /// Create a bitmask from bit positions. Usable in constant context.
    ///
    /// Panics (at compile time when const-evaluated) if a position is out of
    /// range for `T`.
    pub const fn from_indices(indices: &[u32]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < indices.len() {
            assert!(indices[i] < T::COUNT, "bit position out of range");
            bits |= 1u16 << indices[i];
            i += 1;
        }
        Self(bits, PhantomData)
    }

    /// Raw value of the bitmask.
    #[inline]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Check if the bitmask contains a specific value.
    #[inline]
    pub fn contains(&self, bit: T) -> bool {
        (self.0 & bit.bit()) != 0
    }

    /// Insert a value to the bitmask.
    #[inline]
    pub fn insert(&mut self, bit: T) {
        self.0 |= bit.bit();
    }

    /// Remove a value from the bitmask.
    #[inline]
    pub fn remove(&mut self, bit: T) {
        self.0 &= !bit.bit();
    }

    /// Check if the bitmask is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check if the bitmask is subset of another bitmask.
    #[inline]
    pub fn is_subset(&self, other: &Bitmask<T>) -> bool {
        self.0 & other.0 == self.0
    }

    /// Check if the bitmask is superset of another bitmask.
    #[inline]
    pub fn is_superset(&self, other: &Bitmask<T>) -> bool {
        other.is_subset(self)
    }

    /// Elements present in both masks.
    #[inline]
    pub const fn intersection(&self, other: &Bitmask<T>) -> Self {
        Self(self.0 & other.0, PhantomData)
    }

    /// Count the number of bits set in the bitmask.
    #[inline]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate over the elements in the mask, lowest position first.
    /// Bits without a matching element are skipped.
    pub fn iter(&self) -> Iter<T> {
        Iter { remaining: self.0, _marker: PhantomData }
    }
}

impl<T: Bitable> Clone for Bitmask<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Bitable> Copy for Bitmask<T> {}

impl<T: Bitable> PartialEq for Bitmask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Bitable> Eq for Bitmask<T> {}

impl<T: Bitable> Hash for Bitmask<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: Bitable> Default for Bitmask<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Bitable + fmt::Debug> fmt::Debug for Bitmask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Bitable> FromIterator<T> for Bitmask<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for bit in iter {
            mask.insert(bit);
        }
        mask
    }
}

impl<T: Bitable> IntoIterator for Bitmask<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}

/// Iterator over the elements of a [`Bitmask`].
pub struct Iter<T: Bitable> {
    remaining: u16,
    _marker: PhantomData<T>,
}

impl<T: Bitable> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while self.remaining != 0 {
            let index = self.remaining.trailing_zeros();
            self.remaining &= self.remaining - 1;
            if let Some(item) = T::from_index(index) {
                return Some(item);
            }
        }
        None
    }
}
