use std::fmt;
use std::num::{NonZeroU64, NonZeroUsize};
use std::str::FromStr;

use crate::error::ValidationError;

/// Strictly positive integer newtype: zero is rejected at construction, so
/// holders never re-check it.
macro_rules! positive_int {
    ($name:ident, $prim:ty, $nonzero:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($nonzero);

        impl $name {
            #[must_use]
            pub const fn get(self) -> $prim {
                self.0.get()
            }
        }

        impl TryFrom<$prim> for $name {
            type Error = ValidationError;

            fn try_from(value: $prim) -> Result<Self, Self::Error> {
                <$nonzero>::new(value)
                    .map($name)
                    .ok_or(ValidationError::ValueTooSmall { min: 1 })
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value: $prim = s
                    .trim()
                    .parse()
                    .map_err(|err| ValidationError::InvalidNumber { source: err })?;
                $name::try_from(value)
            }
        }

        impl From<$name> for $prim {
            fn from(value: $name) -> Self {
                value.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

positive_int!(PositiveU64, u64, NonZeroU64);
positive_int!(PositiveUsize, usize, NonZeroUsize);
