//! The resource trait.

/// A value that can be stored in a [`Registry`](crate::core::Registry).
///
/// Equality decides whether a second registration under the same identity is
/// a harmless repeat or a conflict.
pub trait Resource: PartialEq {
    /// The resource's own name, used to derive a registration name when none
    /// is given. The registry converts it to snake case.
    fn intrinsic_name(&self) -> Option<&str> {
        None
    }
}
