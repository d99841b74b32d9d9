//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Implemented by every record the stores look up by identifier (invoices,
/// sub-invoices, clients).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Position of the entity with `id` in `records`, if present.
pub fn position_of<E: Entity>(records: &[E], id: &E::Id) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}
