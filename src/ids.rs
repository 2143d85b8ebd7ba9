// Identifier policy - ids for entities created without one
//
// Members derive their id from their name (slug), falling back to a generated
// token. Classes, staff and invoices always get a generated, prefixed token.
// Token generation sits behind `IdPolicy` so tests can make it deterministic.

use crate::store::{Entity, EntityKind};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

pub trait IdPolicy: Send + Sync {
    /// A fresh token for a new entity of `kind`, prefix included
    fn generate(&self, kind: EntityKind) -> String;
}

// ============================================================================
// RANDOM (production)
// ============================================================================

/// uuid v4 tokens; invoices get a short `INV-` number in 100..=999
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdPolicy for RandomIds {
    fn generate(&self, kind: EntityKind) -> String {
        let uuid = uuid::Uuid::new_v4();
        match kind {
            EntityKind::Member => uuid.to_string(),
            EntityKind::Class => format!("class-{}", uuid),
            EntityKind::Staff => format!("staff-{}", uuid),
            EntityKind::Invoice => {
                let bytes = uuid.as_bytes();
                let n = u16::from_le_bytes([bytes[0], bytes[1]]) % 900 + 100;
                format!("INV-{}", n)
            }
        }
    }
}

// ============================================================================
// SEQUENTIAL (deterministic)
// ============================================================================

/// Counter-backed tokens: `member-1`, `class-2`, `staff-3`, `INV-104`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdPolicy for SequentialIds {
    fn generate(&self, kind: EntityKind) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        match kind {
            EntityKind::Member => format!("member-{}", n),
            EntityKind::Class => format!("class-{}", n),
            EntityKind::Staff => format!("staff-{}", n),
            EntityKind::Invoice => format!("INV-{}", 100 + n),
        }
    }
}

// ============================================================================
// DERIVATION
// ============================================================================

/// Lowercase, runs of anything outside `[a-z0-9]` collapsed to one hyphen,
/// no hyphen at either end.
///
/// Example: "  Mary-Jane O'Neil! " → "mary-jane-o-neil"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Text a member name contributes to its slug. Strings, numbers and booleans
/// count; anything else does not.
fn name_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Returns the payload with an `id` guaranteed.
///
/// A payload that already carries a non-empty string id is returned as is.
/// Otherwise the id is placed as the first field, ahead of the payload's own.
pub fn assign_id(kind: EntityKind, payload: Entity, policy: &dyn IdPolicy) -> Entity {
    if payload.has_id() {
        return payload;
    }

    let derived = match kind {
        EntityKind::Member => payload
            .get("name")
            .and_then(name_text)
            .map(|name| slugify(&name))
            .filter(|slug| !slug.is_empty()),
        _ => None,
    };

    let id = derived.unwrap_or_else(|| policy.generate(kind));
    payload.with_leading_id(id)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Ann Lee"), "ann-lee");
        assert_eq!(slugify("  Mary-Jane O'Neil! "), "mary-jane-o-neil");
        assert_eq!(slugify("R2 D2"), "r2-d2");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("Zoë"), "zo");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn test_slug_has_no_edge_hyphens() {
        for name in ["!Ann", "Ann!", "  Ann  ", "__Ann__Lee__"] {
            let slug = slugify(name);
            assert!(!slug.starts_with('-'), "{:?} -> {:?}", name, slug);
            assert!(!slug.ends_with('-'), "{:?} -> {:?}", name, slug);
            assert!(!slug.contains("--"), "{:?} -> {:?}", name, slug);
        }
    }

    #[test]
    fn test_member_id_from_name() {
        let payload = Entity::new().with("name", "Ann Lee").with("status", "active");
        let member = assign_id(EntityKind::Member, payload, &SequentialIds::new());

        assert_eq!(member.id(), Some("ann-lee"));
        assert_eq!(member.keys().first().copied(), Some("id"));
        assert_eq!(member.get_str("status"), Some("active"));
    }

    #[test]
    fn test_member_numeric_name_is_slugged() {
        let payload = Entity::new().with("name", 42);
        let member = assign_id(EntityKind::Member, payload, &SequentialIds::new());
        assert_eq!(member.id(), Some("42"));
    }

    #[test]
    fn test_member_without_usable_name_gets_token() {
        let ids = SequentialIds::new();
        let nameless = assign_id(EntityKind::Member, Entity::new(), &ids);
        let punctuation = assign_id(EntityKind::Member, Entity::new().with("name", "!!!"), &ids);

        assert_eq!(nameless.id(), Some("member-1"));
        assert_eq!(punctuation.id(), Some("member-2"));
    }

    #[test]
    fn test_supplied_id_is_kept() {
        let payload = Entity::new().with("name", "Ann Lee").with("id", "custom");
        let member = assign_id(EntityKind::Member, payload.clone(), &SequentialIds::new());
        assert_eq!(member, payload);
    }

    #[test]
    fn test_empty_or_null_id_is_replaced() {
        let ids = SequentialIds::new();
        let empty = assign_id(EntityKind::Class, Entity::new().with("id", ""), &ids);
        let null = assign_id(EntityKind::Class, Entity::new().with("id", Value::Null), &ids);

        assert_eq!(empty.id(), Some("class-1"));
        assert_eq!(null.id(), Some("class-2"));
    }

    #[test]
    fn test_random_prefixes() {
        let ids = RandomIds;
        assert!(ids.generate(EntityKind::Class).starts_with("class-"));
        assert!(ids.generate(EntityKind::Staff).starts_with("staff-"));
        assert!(uuid::Uuid::parse_str(&ids.generate(EntityKind::Member)).is_ok());

        for _ in 0..200 {
            let invoice = ids.generate(EntityKind::Invoice);
            let n: u16 = invoice.strip_prefix("INV-").unwrap().parse().unwrap();
            assert!((100..=999).contains(&n));
        }
    }

    #[test]
    fn test_class_and_staff_ignore_name() {
        let ids = SequentialIds::new();
        let class = assign_id(EntityKind::Class, Entity::new().with("name", "Yoga"), &ids);
        let staff = assign_id(EntityKind::Staff, Entity::new().with("name", "Bo"), &ids);
        let invoice = assign_id(EntityKind::Invoice, Entity::new().with("amount", 50), &ids);

        assert_eq!(class.id(), Some("class-1"));
        assert_eq!(staff.id(), Some("staff-2"));
        assert_eq!(invoice.id(), Some("INV-103"));
    }
}
