//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Position of the entity with `id` in an insertion-ordered collection.
pub fn position_of<E: Entity>(items: &[E], id: &E::Id) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(u32);

    impl Entity for Row {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.0
        }
    }

    #[test]
    fn finds_first_matching_position() {
        let rows = [Row(4), Row(9), Row(2)];
        assert_eq!(position_of(&rows, &9), Some(1));
        assert_eq!(position_of(&rows, &7), None);
    }
}
