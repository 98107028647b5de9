// SPDX-License-Identifier: Apache-2.0

use std::{
    fmt,
    marker::PhantomData,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

/// A single bit (or group of bits) of a flag enumeration.
///
/// Usually implemented with [`flag_enum!`](crate::flag_enum).
pub trait Flag: Copy {
    type Bits: Copy
        + Eq
        + Default
        + fmt::Debug
        + BitOr<Output = Self::Bits>
        + BitAnd<Output = Self::Bits>
        + Not<Output = Self::Bits>;

    fn bits(self) -> Self::Bits;
}

/// A set of `E` flags stored as their underlying bit mask.
pub struct Flags<E: Flag> {
    bits: E::Bits,
    _flag: PhantomData<E>,
}

impl<E: Flag> Flags<E> {
    pub fn empty() -> Self {
        Self::from_bits(E::Bits::default())
    }

    pub fn from_bits(bits: E::Bits) -> Self {
        Flags {
            bits,
            _flag: PhantomData,
        }
    }

    pub fn bits(self) -> E::Bits {
        self.bits
    }

    pub fn is_empty(self) -> bool {
        self.bits == E::Bits::default()
    }

    /// Returns `true` if every bit of `other` is set.
    pub fn contains(self, other: impl Into<Flags<E>>) -> bool {
        let other = other.into();
        (self.bits & other.bits) == other.bits
    }

    /// Returns `true` if any bit of `other` is set.
    pub fn intersects(self, other: impl Into<Flags<E>>) -> bool {
        !(self & other.into()).is_empty()
    }
}

impl<E: Flag> Clone for Flags<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Flag> Copy for Flags<E> {}

impl<E: Flag> PartialEq for Flags<E> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<E: Flag> Eq for Flags<E> {}

impl<E: Flag> Default for Flags<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: Flag> fmt::Debug for Flags<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Flags").field(&self.bits).finish()
    }
}

impl<E: Flag> From<E> for Flags<E> {
    fn from(flag: E) -> Self {
        Self::from_bits(flag.bits())
    }
}

impl<E: Flag> BitOr for Flags<E> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_bits(self.bits | rhs.bits)
    }
}

impl<E: Flag> BitOr<E> for Flags<E> {
    type Output = Self;

    fn bitor(self, rhs: E) -> Self {
        self | Self::from(rhs)
    }
}

impl<E: Flag> BitAnd for Flags<E> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::from_bits(self.bits & rhs.bits)
    }
}

impl<E: Flag> BitAnd<E> for Flags<E> {
    type Output = Self;

    fn bitand(self, rhs: E) -> Self {
        self & Self::from(rhs)
    }
}

impl<E: Flag> Not for Flags<E> {
    type Output = Self;

    fn not(self) -> Self {
        Self::from_bits(!self.bits)
    }
}

impl<E: Flag> BitOrAssign for Flags<E> {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl<E: Flag> BitOrAssign<E> for Flags<E> {
    fn bitor_assign(&mut self, rhs: E) {
        *self = *self | rhs;
    }
}

impl<E: Flag> BitAndAssign for Flags<E> {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl<E: Flag> BitAndAssign<E> for Flags<E> {
    fn bitand_assign(&mut self, rhs: E) {
        *self = *self & rhs;
    }
}
