// SPDX-License-Identifier: Apache-2.0

//! Storage strategies for derived handles.
//!
//! Some creation calls always produce one native, others produce a batch
//! that shares a parent and is destroyed one element at a time. Both are
//! modelled as a sequence of [`WeakHandle`]s: [`WeakHandle`] itself is the
//! one-element case and [`HandleVec`] the N-element case.

use crate::{NativeHandle, WeakHandle};
use std::{fmt, mem, slice};

/// Storage of the natives owned by one derived handle.
pub trait Slots<H: NativeHandle>: Default {
    /// Creates empty storage for `size` natives.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not valid for this storage.
    fn with_size(size: usize) -> Self;

    /// Returns `true` if the storage holds live natives.
    fn is_live(&self) -> bool;

    /// Number of natives, occupied or not.
    fn size(&self) -> usize;

    fn as_slice(&self) -> &[H];

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    fn slot_mut(&mut self, index: usize) -> &mut WeakHandle<H>;

    /// Hands every occupied native to `f` in creation order and leaves the
    /// storage dead.
    fn release_all<F: FnMut(H)>(&mut self, f: F);

    /// Moves all of `other` into dead storage.
    fn absorb(&mut self, other: &mut Self);

    /// Returns `true` if both refer to the same natives.
    fn same_as(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<H: NativeHandle> Slots<H> for WeakHandle<H> {
    #[track_caller]
    fn with_size(size: usize) -> Self {
        assert_eq!(size, 1, "a unique handle holds exactly one native");
        WeakHandle::empty()
    }

    fn is_live(&self) -> bool {
        self.is_occupied()
    }

    fn size(&self) -> usize {
        1
    }

    fn as_slice(&self) -> &[H] {
        // SAFETY: `WeakHandle<H>` is `#[repr(transparent)]` over `H`.
        unsafe { slice::from_raw_parts(self.as_ptr(), 1) }
    }

    #[track_caller]
    fn slot_mut(&mut self, index: usize) -> &mut WeakHandle<H> {
        assert_eq!(index, 0, "a unique handle only has index 0");
        self
    }

    fn release_all<F: FnMut(H)>(&mut self, mut f: F) {
        if self.is_occupied() {
            f(self.release());
        }
    }

    fn absorb(&mut self, other: &mut Self) {
        self.reset_from(other);
    }
}

/// A fixed-size batch of natives created and destroyed together.
///
/// The batch is live while any of its elements is occupied. Freeing
/// releases every element and clears the sequence, so a partially freed
/// batch cannot be observed.
pub struct HandleVec<H: NativeHandle> {
    slots: Vec<WeakHandle<H>>,
}

impl<H: NativeHandle> Default for HandleVec<H> {
    fn default() -> Self {
        HandleVec { slots: Vec::new() }
    }
}

impl<H: NativeHandle> fmt::Debug for HandleVec<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<H: NativeHandle> Slots<H> for HandleVec<H> {
    #[track_caller]
    fn with_size(size: usize) -> Self {
        assert!(size > 1, "a handle vector holds at least two natives, got {}", size);
        HandleVec {
            slots: (0..size).map(|_| WeakHandle::empty()).collect(),
        }
    }

    fn is_live(&self) -> bool {
        self.slots.iter().any(WeakHandle::is_occupied)
    }

    fn size(&self) -> usize {
        self.slots.len()
    }

    fn as_slice(&self) -> &[H] {
        // SAFETY: `WeakHandle<H>` is `#[repr(transparent)]` over `H`, so a
        // slice of slots has the layout of a slice of natives.
        unsafe { slice::from_raw_parts(self.slots.as_ptr().cast::<H>(), self.slots.len()) }
    }

    #[track_caller]
    fn slot_mut(&mut self, index: usize) -> &mut WeakHandle<H> {
        let len = self.slots.len();
        assert!(index < len, "index {} out of range for {} natives", index, len);
        &mut self.slots[index]
    }

    fn release_all<F: FnMut(H)>(&mut self, mut f: F) {
        for slot in &mut self.slots {
            // each element keeps its own null check
            if slot.is_occupied() {
                f(slot.release());
            }
        }
        self.slots.clear();
    }

    #[track_caller]
    fn absorb(&mut self, other: &mut Self) {
        assert!(!self.is_live(), "absorb() into a live handle vector");
        self.slots = mem::take(&mut other.slots);
    }
}
