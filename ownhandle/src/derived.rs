// SPDX-License-Identifier: Apache-2.0

//! Handles whose destruction needs the native of the object that created
//! them.

use crate::{AsNative, Error, HandleVec, NativeHandle, Result, Slots, Status, WeakHandle};
use log::{debug, trace, warn};
use std::{fmt, marker::PhantomData, mem};

/// Binds a resource kind that is destroyed by a two-argument call taking
/// the parent's native and its own.
pub trait DerivedDeleter {
    /// Native type of the parent.
    type Source: NativeHandle;
    type Native: NativeHandle;

    /// Name of the resource kind, used in errors and logs.
    const OBJECT: &'static str;

    /// Releases `native`, which was created from `source`. Never called
    /// with a null `native`.
    fn destroy(source: Self::Source, native: Self::Native);
}

/// Natives of a derived handle, without the parent.
///
/// The base cannot destroy itself: every operation that may call the
/// deleter takes the parent's native as an argument. A live base that is
/// dropped without being freed trips the [`WeakHandle`] leak check.
pub struct DerivedHandleBase<D: DerivedDeleter, S = WeakHandle<<D as DerivedDeleter>::Native>>
where
    S: Slots<D::Native>,
{
    slots: S,
    _deleter: PhantomData<fn() -> D>,
}

impl<D, S> DerivedHandleBase<D, S>
where
    D: DerivedDeleter,
    S: Slots<D::Native>,
{
    /// Creates empty storage for `size` natives.
    ///
    /// # Panics
    ///
    /// Panics unless `size == 1` for a unique base or `size > 1` for a
    /// vector base.
    #[track_caller]
    pub fn with_size(size: usize) -> Self {
        DerivedHandleBase {
            slots: S::with_size(size),
            _deleter: PhantomData,
        }
    }

    pub fn is_live(&self) -> bool {
        self.slots.is_live()
    }

    /// Destroys every native against `source`, in creation order.
    ///
    /// Returns `false` without calling the deleter if the base is dead.
    pub fn free(&mut self, source: D::Source) -> bool {
        if !self.is_live() {
            return false;
        }

        self.slots.release_all(|native| {
            trace!("Destroying {} {:?} of {:?}", D::OBJECT, native, source);
            D::destroy(source, native);
        });
        true
    }

    pub fn reset(&mut self, source: D::Source) {
        self.free(source);
    }

    /// Destroys the current natives against `source` and takes over all of
    /// `other`'s.
    ///
    /// If both hold the same natives nothing is destroyed, `self` keeps them
    /// and `other` is left empty.
    pub fn reset_from(&mut self, source: D::Source, other: &mut Self) {
        if self.slots.same_as(&other.slots) {
            other.slots.release_all(|_| {});
            return;
        }

        self.free(source);
        self.slots.absorb(&mut other.slots);
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn native(&self, index: usize) -> D::Native {
        let natives = self.slots.as_slice();
        assert!(
            index < natives.len(),
            "index {} out of range for {} natives",
            index,
            natives.len()
        );
        natives[index]
    }

    /// Address of the native at `index`. The natives are contiguous, so
    /// `pnative(0)` can be passed to external calls taking an array.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn pnative(&self, index: usize) -> *const D::Native {
        let natives = self.slots.as_slice();
        assert!(
            index < natives.len(),
            "index {} out of range for {} natives",
            index,
            natives.len()
        );
        &natives[index]
    }

    pub fn as_slice(&self) -> &[D::Native] {
        self.slots.as_slice()
    }

    /// Slot at `index`, for factories filling a fresh base.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut WeakHandle<D::Native> {
        self.slots.slot_mut(index)
    }

    /// Number of natives owned.
    pub fn size(&self) -> usize {
        self.slots.size()
    }
}

impl<D, S> Default for DerivedHandleBase<D, S>
where
    D: DerivedDeleter,
    S: Slots<D::Native>,
{
    fn default() -> Self {
        DerivedHandleBase {
            slots: S::default(),
            _deleter: PhantomData,
        }
    }
}

impl<D, S> fmt::Debug for DerivedHandleBase<D, S>
where
    D: DerivedDeleter,
    S: Slots<D::Native>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedHandleBase")
            .field("object", &D::OBJECT)
            .field("natives", &self.as_slice())
            .finish()
    }
}

/// Owner of natives created from a parent, which remembers the parent's
/// native so it can destroy itself.
///
/// The parent is remembered by value only. Nothing keeps the parent alive:
/// destroying it while derived handles still exist is a caller error.
pub struct DerivedHandle<D: DerivedDeleter, S = WeakHandle<<D as DerivedDeleter>::Native>>
where
    S: Slots<D::Native>,
{
    base: DerivedHandleBase<D, S>,
    source: D::Source,
}

/// Derived handle owning exactly one native.
pub type UniqueHandle<D> = DerivedHandle<D, WeakHandle<<D as DerivedDeleter>::Native>>;

/// Derived handle owning a batch of at least two natives.
pub type VectorHandle<D> = DerivedHandle<D, HandleVec<<D as DerivedDeleter>::Native>>;

impl<D, S> DerivedHandle<D, S>
where
    D: DerivedDeleter,
    S: Slots<D::Native>,
{
    /// Returns a handle that owns nothing.
    pub fn empty() -> Self {
        DerivedHandle {
            base: DerivedHandleBase::default(),
            source: D::Source::NULL,
        }
    }

    /// Creates `size` natives from `parent`, one external call each.
    ///
    /// `create` receives the parent's native and the address of the next
    /// slot. If a call fails, the natives already created are destroyed and
    /// the failure is returned; no handle is produced.
    ///
    /// # Arguments
    ///
    /// * `parent` - The object the natives are created from.
    /// * `size` - Number of natives; must be 1 for [`UniqueHandle`] and more
    ///   than 1 for [`VectorHandle`].
    /// * `context` - What the resource is for, reported on failure.
    /// * `create` - The external creation call.
    ///
    /// # Panics
    ///
    /// Panics if `size` does not fit the storage.
    pub fn create<P, F>(parent: &P, size: usize, context: &str, mut create: F) -> Result<Self>
    where
        P: AsNative<Native = D::Source>,
        F: FnMut(D::Source, &mut D::Native) -> Status,
    {
        let source = parent.as_native();
        if source.is_null() {
            return Err(Error::Uninitialized);
        }

        let mut handle = DerivedHandle {
            base: DerivedHandleBase::with_size(size),
            source,
        };
        for index in 0..size {
            let slot = handle.base.slot_mut(index);
            let status = create(source, slot.native_mut());
            if !status.is_success() {
                slot.release();
                warn!("Could not create {} ({}): {}", D::OBJECT, context, status);
                if index > 0 {
                    debug!("Rolling back {} of {} {}", index, size, D::OBJECT);
                }
                handle.reset();
                return Err(Error::creation(D::OBJECT, status, context));
            }

            if slot.is_empty() {
                handle.reset();
                return Err(Error::EmptyValue);
            }
            trace!("Created {} {:?} of {:?}", D::OBJECT, slot.native(), source);
        }

        Ok(handle)
    }

    /// Takes ownership of natives created elsewhere from `source`.
    ///
    /// # Safety
    ///
    /// - `source` must not be the null sentinel.
    /// - Every element of `natives` must be a live native created from
    ///   `source`.
    /// - The caller transfers ownership: nothing else may destroy them.
    ///
    /// # Panics
    ///
    /// Panics if the number of natives does not fit the storage. Debug
    /// builds also panic on a null `source`.
    #[track_caller]
    pub unsafe fn from_natives<I>(source: D::Source, natives: I) -> Self
    where
        I: IntoIterator<Item = D::Native>,
    {
        debug_assert!(!source.is_null(), "{} adopted with a null parent", D::OBJECT);
        let natives: Vec<D::Native> = natives.into_iter().collect();
        let mut base = DerivedHandleBase::with_size(natives.len());
        for (index, native) in natives.into_iter().enumerate() {
            base.slot_mut(index).reset(native);
        }

        DerivedHandle { base, source }
    }

    /// Live only when both the parent is known and the natives are live.
    pub fn is_live(&self) -> bool {
        !self.source.is_null() && self.base.is_live()
    }

    /// Destroys the natives against the remembered parent and forgets the
    /// parent. Calling it again does nothing.
    pub fn reset(&mut self) {
        self.base.reset(self.source);
        self.source = D::Source::NULL;
    }

    /// Destroys the current natives, against the current parent, and takes
    /// over `other`'s natives and parent.
    pub fn reset_from(&mut self, mut other: Self) {
        self.base.reset_from(self.source, &mut other.base);
        self.source = mem::replace(&mut other.source, D::Source::NULL);
    }

    /// Moves everything into a new handle, leaving this one empty.
    pub fn take(&mut self) -> Self {
        DerivedHandle {
            base: mem::take(&mut self.base),
            source: mem::replace(&mut self.source, D::Source::NULL),
        }
    }

    /// Gives up ownership without destroying anything.
    pub fn into_natives(mut self) -> (D::Source, Vec<D::Native>) {
        let mut natives = Vec::with_capacity(self.base.size());
        self.base.slots.release_all(|native| natives.push(native));
        let source = mem::replace(&mut self.source, D::Source::NULL);
        (source, natives)
    }

    pub fn source_native(&self) -> D::Source {
        self.source
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn native(&self, index: usize) -> D::Native {
        self.base.native(index)
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn pnative(&self, index: usize) -> *const D::Native {
        self.base.pnative(index)
    }

    pub fn as_slice(&self) -> &[D::Native] {
        self.base.as_slice()
    }

    pub fn size(&self) -> usize {
        self.base.size()
    }
}

impl<D, S> Default for DerivedHandle<D, S>
where
    D: DerivedDeleter,
    S: Slots<D::Native>,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<D: DerivedDeleter> AsNative for UniqueHandle<D> {
    type Native = D::Native;

    fn as_native(&self) -> D::Native {
        if self.is_live() {
            self.native(0)
        } else {
            D::Native::NULL
        }
    }
}

impl<D, S> fmt::Debug for DerivedHandle<D, S>
where
    D: DerivedDeleter,
    S: Slots<D::Native>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedHandle")
            .field("object", &D::OBJECT)
            .field("source", &self.source)
            .field("natives", &self.as_slice())
            .finish()
    }
}

impl<D, S> Drop for DerivedHandle<D, S>
where
    D: DerivedDeleter,
    S: Slots<D::Native>,
{
    fn drop(&mut self) {
        self.base.free(self.source);
    }
}
