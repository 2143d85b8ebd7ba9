// Lookup strategy - how a path identifier selects an entity
//
// An identifier matches an entity when any of the strategy's keys holds a
// string equal to it. Keys are tried in priority order per entity, and the
// first entity in collection order that matches wins.

use crate::store::{Entity, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupStrategy {
    keys: &'static [&'static str],
}

impl LookupStrategy {
    /// Members answer to their `id` or their `name`
    pub const ID_OR_NAME: LookupStrategy = LookupStrategy { keys: &["id", "name"] };

    pub const ID_ONLY: LookupStrategy = LookupStrategy { keys: &["id"] };

    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Member => Self::ID_OR_NAME,
            EntityKind::Class | EntityKind::Staff | EntityKind::Invoice => Self::ID_ONLY,
        }
    }

    /// The key through which `entity` matches, if any
    pub fn matched_key(&self, entity: &Entity, identifier: &str) -> Option<&'static str> {
        self.keys
            .iter()
            .copied()
            .find(|key| entity.get_str(key) == Some(identifier))
    }

    pub fn matches(&self, entity: &Entity, identifier: &str) -> bool {
        self.matched_key(entity, identifier).is_some()
    }

    /// Position of the first matching entity
    pub fn position(&self, entities: &[Entity], identifier: &str) -> Option<usize> {
        entities.iter().position(|e| self.matches(e, identifier))
    }

    pub fn find<'a>(&self, entities: &'a [Entity], identifier: &str) -> Option<&'a Entity> {
        self.position(entities, identifier).map(|i| &entities[i])
    }
}
