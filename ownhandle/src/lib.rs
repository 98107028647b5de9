// SPDX-License-Identifier: Apache-2.0

//! Move-only owners for natives issued by C-style create/destroy APIs.
//!
//! A *source* handle is destroyed by a one-argument deleter; a *derived*
//! handle needs the native of the object that created it as well. Both are
//! built from [`WeakHandle`], a slot that stores a native but never destroys
//! it. Deleters are bound per resource kind through [`SourceDeleter`] and
//! [`DerivedDeleter`] and are resolved at compile time.

mod macros;

pub mod derived;
pub mod error;
pub mod flags;
pub mod handle;
#[cfg(feature = "sim")]
pub mod sim;
pub mod slots;
pub mod source;
pub mod version;
pub mod weak;

pub use derived::{DerivedDeleter, DerivedHandle, DerivedHandleBase, UniqueHandle, VectorHandle};
pub use error::{Error, Result, Status};
pub use flags::{Flag, Flags};
pub use handle::{AsNative, NativeHandle};
pub use slots::{HandleVec, Slots};
pub use source::{SourceDeleter, SourceHandle};
pub use version::Version;
pub use weak::WeakHandle;
