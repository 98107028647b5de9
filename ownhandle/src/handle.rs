// SPDX-License-Identifier: Apache-2.0

use std::{ffi::c_void, fmt::Debug, ptr};

/// Opaque value an external API hands out for a live resource.
///
/// Every native type reserves exactly one value, [`NativeHandle::NULL`], that
/// stands for "no resource". All liveness checks compare against it and
/// nothing else.
pub trait NativeHandle: Copy + Eq + Debug {
    /// The sentinel stored in an empty slot.
    const NULL: Self;

    /// Returns `true` if this is the null sentinel.
    fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl NativeHandle for u64 {
    const NULL: Self = 0;
}

impl NativeHandle for usize {
    const NULL: Self = 0;
}

impl NativeHandle for *mut c_void {
    const NULL: Self = ptr::null_mut();
}

impl NativeHandle for *const c_void {
    const NULL: Self = ptr::null();
}

/// Lends the native of a live object, typically to create derived handles
/// from it.
pub trait AsNative {
    /// The native type being lent.
    type Native: NativeHandle;

    /// Returns the native value, or the null sentinel if the object is dead.
    fn as_native(&self) -> Self::Native;
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_native_handle! {
        /// Test handle with a non-zero sentinel.
        struct Odd(i32) = -1;
    }

    #[test]
    fn integer_sentinel_is_zero() {
        assert!(0u64.is_null());
        assert!(!7u64.is_null());
        assert!(0usize.is_null());
    }

    #[test]
    fn pointer_sentinel_is_null_pointer() {
        let mut value = 5u8;
        let occupied = &mut value as *mut u8 as *mut c_void;
        assert!(<*mut c_void as NativeHandle>::NULL.is_null());
        assert!(!occupied.is_null());
    }

    #[test]
    fn custom_sentinel_is_used_instead_of_zero() {
        assert!(Odd(-1).is_null());
        assert!(!Odd(0).is_null());
        assert_eq!(Odd::NULL, Odd(-1));
        assert_eq!(i32::from(Odd(4)), 4);
    }
}
