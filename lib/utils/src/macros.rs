//! Macros for small identifier newtypes.

/// Implement the conversions shared by every identifier newtype:
/// `From<$type>`, `Into<$type>`, [Display](core::fmt::Display) and const accessors.
#[macro_export]
macro_rules! impl_id {
    ($name: ident, $type: ty) => {
        impl core::convert::From<$type> for $name {
            fn from(value: $type) -> Self {
                $name { inner: value }
            }
        }

        impl core::convert::From<$name> for $type {
            fn from(value: $name) -> $type {
                value.inner
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.inner, f)
            }
        }

        impl $name {
            pub const fn new(value: $type) -> Self {
                $name { inner: value }
            }
            pub const fn value(self) -> $type {
                self.inner
            }
        }
    };
}

/// Define a transparent, totally ordered identifier wrapping a primitive.
///
/// ```
/// utils::define_id!(
///     /// Line number on a GPIO chip.
///     PinId, u32
/// );
/// let pin = PinId::new(13);
/// assert_eq!(u32::from(pin), 13);
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta: meta])* $name: ident, $type: ty) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name {
            inner: $type,
        }

        $crate::impl_id!($name, $type);
    };
}

#[cfg(test)]
mod tests {
    define_id!(
        /// Test identifier.
        Minor, u32
    );

    #[test]
    fn id_round_trips_through_primitive() {
        let minor = Minor::from(7);
        assert_eq!(minor.value(), 7);
        assert_eq!(u32::from(minor), 7);
        assert_eq!(alloc::format!("{}", minor), "7");
        assert!(Minor::new(1) < Minor::new(2));
    }
}
