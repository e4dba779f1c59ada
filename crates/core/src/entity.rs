//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Short, stable prefix used when an entity is addressed from markup
    /// (e.g. `todo` gives element ids like `todo-42`).
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Element id for the rendered entity (`<kind>-<id>`).
    fn dom_id(&self) -> String {
        format!("{}-{}", Self::KIND, self.id())
    }
}
