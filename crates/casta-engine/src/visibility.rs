//! Name-based member visibility
//!
//! Visibility is derived from the member name alone and never declared
//! separately: two leading underscores mark a private member, one marks a
//! protected member, anything else is public. Every other component reads
//! visibility through [`Visibility::classify`].

use std::fmt;

/// Member visibility derived from the member name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Accessible from anywhere
    Public,
    /// Accessible from the declaring class and its subclasses
    Protected,
    /// Accessible from the declaring class only
    Private,
}

impl Visibility {
    /// Classify a member name.
    ///
    /// Total over all strings: an unrecognized pattern (including the
    /// empty string) classifies as public.
    pub fn classify(name: &str) -> Visibility {
        if name.starts_with("__") {
            Visibility::Private
        } else if name.starts_with('_') {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}
