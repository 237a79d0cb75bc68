mod bitmask;

pub use bitmask::{Bitmask, Iter};

/// Largest number of positions a [`Bitmask`] can hold.
pub const MAX_BITS: u32 = u16::BITS;

/// An element with a fixed bit position inside a [`Bitmask`].
///
/// Positions are part of the data layout exchanged with other modules, so an
/// implementation must never reorder them once published. Usually derived
/// with `padplug_bit_derive::Bit`, which assigns positions in declaration
/// order.
pub trait Bitable: Copy + Sized + 'static {
    /// Number of positions in use, at most [`MAX_BITS`].
    const COUNT: u32;

    fn bit(&self) -> u16;
    fn index(&self) -> u32;
    fn from_index(index: u32) -> Option<Self>;
}
