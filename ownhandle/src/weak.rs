// SPDX-License-Identifier: Apache-2.0

use crate::NativeHandle;
use log::error;
use std::{fmt, mem, thread};

/// Storage for one native that never calls a deleter.
///
/// Owners are built out of `WeakHandle`s. The slot only moves its value
/// around; deciding when to destroy it is up to the owner. `replace` and
/// `reset` each state whether the slot must be occupied or empty beforehand
/// and panic otherwise.
///
/// Dropping an occupied slot leaks the resource. That is a bug in the owner:
/// it is logged, and debug builds panic.
#[repr(transparent)]
pub struct WeakHandle<H: NativeHandle> {
    native: H,
}

impl<H: NativeHandle> WeakHandle<H> {
    /// Creates an empty slot.
    pub const fn empty() -> Self {
        WeakHandle { native: H::NULL }
    }

    /// Creates a slot holding `native`.
    pub fn new(native: H) -> Self {
        WeakHandle { native }
    }

    pub fn is_empty(&self) -> bool {
        self.native.is_null()
    }

    pub fn is_occupied(&self) -> bool {
        !self.is_empty()
    }

    /// Returns the stored value, the null sentinel when empty.
    pub fn native(&self) -> H {
        self.native
    }

    pub fn as_ptr(&self) -> *const H {
        &self.native
    }

    /// Address of the slot, for external calls that write a new native
    /// into it.
    pub fn as_mut_ptr(&mut self) -> *mut H {
        &mut self.native
    }

    pub(crate) fn native_mut(&mut self) -> &mut H {
        &mut self.native
    }

    /// Hands the stored value out and leaves the slot empty.
    pub fn release(&mut self) -> H {
        mem::replace(&mut self.native, H::NULL)
    }

    /// Stores `native` and returns the previous value.
    ///
    /// # Panics
    ///
    /// Panics if the slot is empty.
    #[track_caller]
    pub fn replace(&mut self, native: H) -> H {
        assert!(self.is_occupied(), "replace() on an empty handle slot");
        mem::replace(&mut self.native, native)
    }

    /// Takes over the value of `other`, which is left empty, and returns the
    /// previous value.
    ///
    /// # Panics
    ///
    /// Panics if the slot is empty.
    #[track_caller]
    pub fn replace_with(&mut self, other: &mut Self) -> H {
        assert!(self.is_occupied(), "replace_with() on an empty handle slot");
        mem::replace(&mut self.native, other.release())
    }

    /// Stores `native` in an empty slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is occupied, since the old value would leak.
    #[track_caller]
    pub fn reset(&mut self, native: H) {
        assert!(
            self.is_empty(),
            "reset() on an occupied handle slot would leak {:?}",
            self.native
        );
        self.native = native;
    }

    /// Takes over the value of `other`, which is left empty.
    ///
    /// # Panics
    ///
    /// Panics if the slot is occupied, since the old value would leak.
    #[track_caller]
    pub fn reset_from(&mut self, other: &mut Self) {
        assert!(
            self.is_empty(),
            "reset_from() on an occupied handle slot would leak {:?}",
            self.native
        );
        self.native = other.release();
    }

    /// Moves the value into a new slot, leaving this one empty.
    pub fn take(&mut self) -> Self {
        WeakHandle {
            native: self.release(),
        }
    }
}

impl<H: NativeHandle> Default for WeakHandle<H> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H: NativeHandle> fmt::Debug for WeakHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakHandle").field(&self.native).finish()
    }
}

impl<H: NativeHandle> Drop for WeakHandle<H> {
    fn drop(&mut self) {
        if self.is_occupied() && !thread::panicking() {
            error!("Leaking native handle {:?}", self.native);
            debug_assert!(false, "weak handle dropped while holding {:?}", self.native);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_reports_sentinel() {
        let slot = WeakHandle::<u64>::empty();
        assert!(slot.is_empty());
        assert_eq!(slot.native(), 0);
    }

    #[test]
    fn release_empties_the_slot() {
        let mut slot = WeakHandle::new(9u64);
        assert!(slot.is_occupied());
        assert_eq!(slot.release(), 9);
        assert!(slot.is_empty());
        // releasing an empty slot is allowed
        assert_eq!(slot.release(), 0);
    }

    #[test]
    fn replace_returns_previous_value() {
        let mut slot = WeakHandle::new(1u64);
        assert_eq!(slot.replace(2), 1);
        assert_eq!(slot.replace(0), 2);
        assert!(slot.is_empty());
    }

    #[test]
    fn replace_with_absorbs_other() {
        let mut slot = WeakHandle::new(1u64);
        let mut other = WeakHandle::new(2u64);
        assert_eq!(slot.replace_with(&mut other), 1);
        assert!(other.is_empty());
        assert_eq!(slot.release(), 2);
    }

    #[test]
    #[should_panic(expected = "replace() on an empty handle slot")]
    fn replace_on_empty_panics() {
        let mut slot = WeakHandle::<u64>::empty();
        let _ = slot.replace(3);
    }

    #[test]
    fn reset_fills_empty_slot() {
        let mut slot = WeakHandle::<u64>::empty();
        slot.reset(5);
        assert_eq!(slot.native(), 5);

        let mut other = WeakHandle::new(6u64);
        slot.release();
        slot.reset_from(&mut other);
        assert!(other.is_empty());
        assert_eq!(slot.release(), 6);
    }

    #[test]
    #[should_panic(expected = "would leak")]
    fn reset_on_occupied_panics() {
        let mut slot = WeakHandle::new(4u64);
        slot.reset(5);
    }

    #[test]
    fn take_moves_value() {
        let mut slot = WeakHandle::new(8u64);
        let mut moved = slot.take();
        assert!(slot.is_empty());
        assert_eq!(moved.release(), 8);
    }

    #[test]
    fn slot_is_layout_compatible_with_native() {
        assert_eq!(
            std::mem::size_of::<WeakHandle<u64>>(),
            std::mem::size_of::<u64>()
        );
        let mut slot = WeakHandle::<u64>::empty();
        unsafe { *slot.as_mut_ptr() = 12 };
        assert_eq!(unsafe { *slot.as_ptr() }, 12);
        slot.release();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "weak handle dropped while holding")]
    fn dropping_occupied_slot_panics_in_debug() {
        let _slot = WeakHandle::new(1u64);
    }
}
