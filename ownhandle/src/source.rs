// SPDX-License-Identifier: Apache-2.0

use crate::{AsNative, Error, NativeHandle, Result, Status, WeakHandle};
use log::{trace, warn};
use std::{fmt, marker::PhantomData};

/// Binds a resource kind that is destroyed by a one-argument call.
pub trait SourceDeleter {
    type Native: NativeHandle;

    /// Name of the resource kind, used in errors and logs.
    const OBJECT: &'static str;

    /// Releases `native`. Never called with the null sentinel.
    fn destroy(native: Self::Native);
}

/// Owner of a native created directly by the process, with no parent.
///
/// The handle can be moved but not copied and calls `D::destroy` exactly
/// once for the native it holds, when dropped or reset.
pub struct SourceHandle<D: SourceDeleter> {
    slot: WeakHandle<D::Native>,
    _deleter: PhantomData<fn() -> D>,
}

impl<D: SourceDeleter> SourceHandle<D> {
    /// Returns a handle that owns nothing.
    pub fn empty() -> Self {
        SourceHandle {
            slot: WeakHandle::empty(),
            _deleter: PhantomData,
        }
    }

    /// Runs an external creation call and takes ownership of its result.
    ///
    /// `create` receives the address of the slot and returns the external
    /// status. On failure whatever it wrote is discarded and no deleter is
    /// called.
    ///
    /// # Arguments
    ///
    /// * `context` - What the resource is for, reported on failure.
    /// * `create` - The external creation call.
    pub fn create<F>(context: &str, create: F) -> Result<Self>
    where
        F: FnOnce(&mut D::Native) -> Status,
    {
        let mut handle = Self::empty();
        let status = create(handle.slot.native_mut());
        if !status.is_success() {
            handle.slot.release();
            warn!("Could not create {} ({}): {}", D::OBJECT, context, status);
            return Err(Error::creation(D::OBJECT, status, context));
        }

        if handle.slot.is_empty() {
            return Err(Error::EmptyValue);
        }

        trace!("Created {} {:?}", D::OBJECT, handle.native());
        Ok(handle)
    }

    /// Takes ownership of a native created elsewhere.
    ///
    /// # Safety
    ///
    /// - `native` must be a live native of this kind, or the null sentinel.
    /// - The caller transfers ownership: nothing else may destroy it.
    pub unsafe fn from_native(native: D::Native) -> Self {
        SourceHandle {
            slot: WeakHandle::new(native),
            _deleter: PhantomData,
        }
    }

    pub fn is_live(&self) -> bool {
        self.slot.is_occupied()
    }

    pub fn native(&self) -> D::Native {
        self.slot.native()
    }

    pub fn as_ptr(&self) -> *const D::Native {
        self.slot.as_ptr()
    }

    /// Destroys the native if there is one. Returns whether anything was
    /// destroyed.
    pub fn free(&mut self) -> bool {
        if self.slot.is_empty() {
            return false;
        }

        let native = self.slot.release();
        trace!("Destroying {} {:?}", D::OBJECT, native);
        D::destroy(native);
        true
    }

    /// Destroys the native if there is one. Calling it again does nothing.
    pub fn reset(&mut self) {
        self.free();
    }

    /// Destroys the current native and takes over the one held by `other`.
    ///
    /// If both hold the same native nothing is destroyed and `self` keeps it.
    pub fn reset_from(&mut self, mut other: Self) {
        if self.slot.native() == other.slot.native() {
            other.slot.release();
            return;
        }

        self.free();
        self.slot.reset_from(&mut other.slot);
    }

    /// Moves the native into a new handle, leaving this one empty.
    pub fn take(&mut self) -> Self {
        SourceHandle {
            slot: self.slot.take(),
            _deleter: PhantomData,
        }
    }

    /// Gives up ownership without destroying the native.
    pub fn into_native(mut self) -> D::Native {
        self.slot.release()
    }
}

impl<D: SourceDeleter> Default for SourceHandle<D> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<D: SourceDeleter> AsNative for SourceHandle<D> {
    type Native = D::Native;

    fn as_native(&self) -> D::Native {
        self.native()
    }
}

impl<D: SourceDeleter> fmt::Debug for SourceHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("object", &D::OBJECT)
            .field("native", &self.native())
            .finish()
    }
}

impl<D: SourceDeleter> Drop for SourceHandle<D> {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use crate::sim::{self, Event, Root, RootHandle, SimHandle};

    fn destroyed(events: &[Event]) -> Vec<SimHandle> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Destroyed { handle, .. } => Some(*handle),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn drop_destroys_once() {
        sim::reset();
        let native = {
            let root = sim::root("test").unwrap();
            assert!(root.is_live());
            root.native()
        };
        assert_eq!(destroyed(&sim::events()), vec![native]);
        assert_eq!(sim::live(), 0);
    }

    #[test]
    fn reset_is_idempotent() {
        sim::reset();
        let mut root = sim::root("test").unwrap();
        root.reset();
        root.reset();
        assert!(!root.is_live());
        drop(root);
        assert_eq!(sim::deleter_calls(), 1);
        assert!(sim::faults().is_empty());
    }

    #[test]
    fn free_reports_whether_anything_was_destroyed() {
        sim::reset();
        let mut root = sim::root("test").unwrap();
        assert!(root.free());
        assert!(!root.free());
        assert!(!RootHandle::empty().free());
    }

    #[test]
    fn take_transfers_ownership() {
        sim::reset();
        let mut first = sim::root("test").unwrap();
        let native = first.native();

        let second = first.take();
        assert!(!first.is_live());
        assert_eq!(first.native(), SimHandle::NULL);
        assert!(second.is_live());
        assert_eq!(second.native(), native);

        drop(first);
        assert_eq!(sim::deleter_calls(), 0);
        drop(second);
        assert_eq!(sim::deleter_calls(), 1);
    }

    #[test]
    fn reset_from_frees_current_and_absorbs_other() {
        sim::reset();
        let mut target = sim::root("target").unwrap();
        let other = sim::root("other").unwrap();
        let (old, new) = (target.native(), other.native());

        target.reset_from(other);
        assert_eq!(target.native(), new);
        assert_eq!(destroyed(&sim::events()), vec![old]);

        drop(target);
        assert_eq!(destroyed(&sim::events()), vec![old, new]);
        assert!(sim::faults().is_empty());
    }

    #[test]
    fn reset_from_same_native_is_a_no_op() {
        sim::reset();
        let mut root = sim::root("test").unwrap();
        let alias = unsafe { RootHandle::from_native(root.native()) };

        root.reset_from(alias);
        assert!(root.is_live());
        assert_eq!(sim::deleter_calls(), 0);

        drop(root);
        assert_eq!(sim::deleter_calls(), 1);
        assert!(sim::faults().is_empty());
    }

    #[test]
    fn failed_creation_discards_written_value() {
        sim::reset();
        sim::fail_after(0);
        let err = sim::root("doomed").unwrap_err();
        assert_eq!(err.status(), Some(sim::OUT_OF_MEMORY));
        assert_eq!(err.object(), Some(Root::OBJECT));
        assert_eq!(sim::deleter_calls(), 0);
        assert!(sim::faults().is_empty());
    }

    #[test]
    fn success_without_a_value_is_an_error() {
        let err = RootHandle::create("lazy", |_| Status::SUCCESS).unwrap_err();
        assert_eq!(err, Error::EmptyValue);
    }

    #[test]
    fn into_native_hands_out_without_destroying() {
        sim::reset();
        let root = sim::root("test").unwrap();
        let native = root.into_native();
        assert_eq!(sim::deleter_calls(), 0);

        sim::destroy_root(native);
        assert!(sim::faults().is_empty());
    }
}
