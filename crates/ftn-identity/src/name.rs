// name.rs
//
// Handle for an interned source name.

/// Interned source name. Equality is identity of the interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u32);

impl Name {
    /// Only the interner hands these out.
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    /// Create a Name with an arbitrary index in test code.
    #[cfg(any(test, feature = "testing"))]
    pub fn new_for_test(index: u32) -> Self {
        Self(index)
    }
}
