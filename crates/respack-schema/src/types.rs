//! Newtype wrappers for string identifiers, providing compile-time type safety.
//!
//! All newtypes serialize/deserialize as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Java package that scopes a generated `R` class, e.g. `org.chromium.foo`.
    PackageName
);

string_newtype!(
    /// Hex-encoded blake3 digest over a fingerprint set.
    Fingerprint
);

impl PackageName {
    /// Directory path of the package inside a source tree (`org/chromium/foo`).
    pub fn to_source_dir(&self) -> String {
        self.0.replace('.', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_display_and_as_ref() {
        let p = PackageName::new("org.chromium.base");
        assert_eq!(p.to_string(), "org.chromium.base");
        assert_eq!(p.as_str(), "org.chromium.base");
        assert_eq!(AsRef::<str>::as_ref(&p), "org.chromium.base");
    }

    #[test]
    fn package_source_dir() {
        let p = PackageName::from("org.chromium.ui");
        assert_eq!(p.to_source_dir(), "org/chromium/ui");
    }

    #[test]
    fn fingerprint_serde_roundtrip() {
        let f = Fingerprint::new("deadbeef");
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, "\"deadbeef\"");
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn fingerprint_into_inner() {
        let f = Fingerprint::new("abc".to_owned());
        assert_eq!(f.into_inner(), "abc");
    }
}
