// SPDX-License-Identifier: Apache-2.0

/// Declares a `#[repr(transparent)]` native handle type and its null
/// sentinel.
///
/// ```
/// ownhandle::define_native_handle! {
///     /// A non-dispatchable 64-bit handle.
///     pub struct Fence(u64) = 0;
/// }
///
/// use ownhandle::NativeHandle;
/// assert!(Fence::NULL.is_null());
/// ```
#[macro_export]
macro_rules! define_native_handle {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident($repr:ty) = $null:expr;
    ) => {
        $(#[$attr])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name(pub $repr);

        impl $crate::NativeHandle for $name {
            const NULL: Self = $name($null);
        }

        impl From<$repr> for $name {
            fn from(raw: $repr) -> Self {
                $name(raw)
            }
        }

        impl From<$name> for $repr {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }
    };
}

/// Implements [`Flag`](crate::Flag) for fieldless enums whose discriminants
/// are bit values.
///
/// Also lets two enumerators be or-ed straight into a
/// [`Flags`](crate::Flags) set.
///
/// ```
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// #[repr(u32)]
/// enum Access {
///     Read = 0x1,
///     Write = 0x2,
/// }
/// ownhandle::flag_enum!(Access: u32);
///
/// let rw = Access::Read | Access::Write;
/// assert_eq!(rw.bits(), 0x3);
/// ```
#[macro_export]
macro_rules! flag_enum {
    ($($name:ty : $bits:ty),+ $(,)?) => {
        $(
            impl $crate::Flag for $name {
                type Bits = $bits;

                fn bits(self) -> $bits {
                    self as $bits
                }
            }

            impl ::std::ops::BitOr for $name {
                type Output = $crate::Flags<$name>;

                fn bitor(self, rhs: Self) -> Self::Output {
                    $crate::Flags::from(self) | rhs
                }
            }

            impl ::std::ops::BitAnd for $name {
                type Output = $crate::Flags<$name>;

                fn bitand(self, rhs: Self) -> Self::Output {
                    $crate::Flags::from(self) & rhs
                }
            }

            impl ::std::ops::Not for $name {
                type Output = $crate::Flags<$name>;

                fn not(self) -> Self::Output {
                    !$crate::Flags::from(self)
                }
            }
        )+
    };
}
