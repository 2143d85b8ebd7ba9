// Store document - the single aggregate persisted as one JSON file
//
// Entities are open JSON objects: only `id`, `name`, `status` and `amount`
// carry meaning here, every other field is stored and echoed back untouched.
// Nothing about the document's shape is enforced beyond it being an object;
// whatever cannot be typed is carried along verbatim.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// ENTITY KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Member,
    Class,
    Staff,
    Invoice,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Member,
        EntityKind::Class,
        EntityKind::Staff,
        EntityKind::Invoice,
    ];

    /// Top-level key of this kind's collection in the document
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Member => "members",
            EntityKind::Class => "classes",
            EntityKind::Staff => "staff",
            EntityKind::Invoice => "invoices",
        }
    }

    /// Human label used in error bodies ("Member not found")
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Member => "Member",
            EntityKind::Class => "Class",
            EntityKind::Staff => "Staff",
            EntityKind::Invoice => "Invoice",
        }
    }
}

// ============================================================================
// ENTITY
// ============================================================================

/// One record of any collection. Records created through this crate are
/// ordered JSON objects; records found in the document that are not objects
/// are kept as they are and simply never match a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Value);

impl Entity {
    pub fn new() -> Self {
        Entity(Value::Object(Map::new()))
    }

    /// Field value if it is a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    /// Builder-style field setter, mostly for fixtures
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Some(fields) = self.0.as_object_mut() {
            fields.insert(key.to_string(), value.into());
        }
        self
    }

    /// Returns a copy carrying `id` as its first field, followed by the
    /// payload's own fields. A non-empty string `id` already in the payload
    /// is kept as is.
    pub fn with_leading_id(self, id: String) -> Self {
        let mut ordered = Map::new();
        ordered.insert("id".to_string(), Value::String(id));
        if let Value::Object(fields) = self.0 {
            for (key, value) in fields {
                if key == "id" {
                    continue;
                }
                ordered.insert(key, value);
            }
        }
        Entity(Value::Object(ordered))
    }

    /// True when the entity has an `id` worth keeping (a non-empty string)
    pub fn has_id(&self) -> bool {
        self.id().is_some_and(|id| !id.is_empty())
    }

    /// Shallow merge: every field of `patch` overwrites the same field here,
    /// fields absent from `patch` are left alone
    pub fn merge(&mut self, patch: &Entity) {
        let Some(changes) = patch.0.as_object() else {
            return;
        };
        match self.0.as_object_mut() {
            Some(fields) => {
                for (key, value) in changes {
                    fields.insert(key.clone(), value.clone());
                }
            }
            None => self.0 = Value::Object(changes.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.0.as_object().map_or(0, Map::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field names in stored order
    pub(crate) fn keys(&self) -> Vec<&str> {
        self.0
            .as_object()
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(map: Map<String, Value>) -> Self {
        Entity(Value::Object(map))
    }
}

// ============================================================================
// STORE
// ============================================================================

/// The whole persisted document
///
/// Missing or `null` collections read back as empty. A collection (or
/// `settings`) holding something other than an array (an object) is left in
/// `extra` under its own key and written back verbatim until that collection
/// gets an entry. Unknown top-level keys also live in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    pub members: Vec<Entity>,
    pub classes: Vec<Entity>,
    pub staff: Vec<Entity>,
    pub invoices: Vec<Entity>,
    pub settings: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl Store {
    /// Reads a parsed document. Only a non-object top level is refused.
    pub fn from_value(value: Value) -> Option<Store> {
        let Value::Object(mut doc) = value else {
            return None;
        };

        let mut store = Store::default();
        for kind in EntityKind::ALL {
            let name = kind.collection_name();
            match doc.remove(name) {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => {
                    *store.collection_mut(kind) = items.into_iter().map(Entity).collect();
                }
                Some(other) => {
                    store.extra.insert(name.to_string(), other);
                }
            }
        }

        match doc.remove("settings") {
            None | Some(Value::Null) => {}
            Some(Value::Object(settings)) => store.settings = settings,
            Some(other) => {
                store.extra.insert("settings".to_string(), other);
            }
        }

        store.extra.extend(doc);
        Some(store)
    }

    /// The document as written to disk
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();

        for kind in EntityKind::ALL {
            let name = kind.collection_name();
            let items = self.collection(kind);
            let value = match self.extra.get(name) {
                Some(raw) if items.is_empty() => raw.clone(),
                _ => Value::Array(items.iter().map(|e| e.0.clone()).collect()),
            };
            doc.insert(name.to_string(), value);
        }

        let settings = match self.extra.get("settings") {
            Some(raw) if self.settings.is_empty() => raw.clone(),
            _ => Value::Object(self.settings.clone()),
        };
        doc.insert("settings".to_string(), settings);

        for (key, value) in &self.extra {
            if !doc.contains_key(key) {
                doc.insert(key.clone(), value.clone());
            }
        }
        doc
    }

    pub fn collection(&self, kind: EntityKind) -> &Vec<Entity> {
        match kind {
            EntityKind::Member => &self.members,
            EntityKind::Class => &self.classes,
            EntityKind::Staff => &self.staff,
            EntityKind::Invoice => &self.invoices,
        }
    }

    pub fn collection_mut(&mut self, kind: EntityKind) -> &mut Vec<Entity> {
        match kind {
            EntityKind::Member => &mut self.members,
            EntityKind::Class => &mut self.classes,
            EntityKind::Staff => &mut self.staff,
            EntityKind::Invoice => &mut self.invoices,
        }
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Store {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Store::from_value(value).ok_or_else(|| de::Error::custom("store document is not a JSON object"))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_store_serializes_all_collections() {
        let value = serde_json::to_value(Store::default()).unwrap();
        assert_eq!(
            value,
            json!({ "members": [], "classes": [], "staff": [], "invoices": [], "settings": {} })
        );
    }

    #[test]
    fn test_missing_and_null_collections_default_to_empty() {
        let store: Store = serde_json::from_value(json!({
            "members": [{ "id": "ann", "name": "Ann" }],
            "invoices": null
        }))
        .unwrap();

        assert_eq!(store.members.len(), 1);
        assert!(store.classes.is_empty());
        assert!(store.invoices.is_empty());
        assert!(store.settings.is_empty());
    }

    #[test]
    fn test_unknown_top_level_keys_survive() {
        let store: Store = serde_json::from_value(json!({
            "members": [],
            "announcements": ["pool closed"]
        }))
        .unwrap();

        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["announcements"], json!(["pool closed"]));
    }

    #[test]
    fn test_non_object_document_is_refused() {
        assert!(Store::from_value(json!([1, 2])).is_none());
        assert!(Store::from_value(json!("members")).is_none());
        assert!(serde_json::from_value::<Store>(json!(null)).is_err());
    }

    #[test]
    fn test_odd_shapes_are_kept_verbatim() {
        let doc = json!({
            "members": [{ "id": "ann", "name": "Ann" }, "walk-in", 7],
            "classes": { "yoga": { "time": "9am" } },
            "settings": []
        });

        let store = Store::from_value(doc.clone()).unwrap();

        assert_eq!(store.members.len(), 3);
        assert_eq!(store.members[0].id(), Some("ann"));
        assert!(!store.members[1].is_object());
        assert!(store.classes.is_empty());
        assert_eq!(serde_json::to_value(&store).unwrap()["members"], doc["members"]);
        assert_eq!(serde_json::to_value(&store).unwrap()["classes"], doc["classes"]);
        assert_eq!(serde_json::to_value(&store).unwrap()["settings"], json!([]));
    }

    #[test]
    fn test_written_collection_replaces_odd_shape() {
        let mut store = Store::from_value(json!({ "classes": "tbd" })).unwrap();
        store.classes.push(Entity::new().with("id", "spin"));

        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["classes"], json!([{ "id": "spin" }]));
    }

    #[test]
    fn test_merge_is_shallow_and_patch_wins() {
        let mut member = Entity::new()
            .with("id", "ann")
            .with("name", "Ann")
            .with("status", "active")
            .with("plan", json!({ "tier": "gold", "months": 12 }));
        let patch = Entity::new()
            .with("status", "inactive")
            .with("plan", json!({ "tier": "silver" }));

        member.merge(&patch);

        assert_eq!(member.get_str("status"), Some("inactive"));
        assert_eq!(member.name(), Some("Ann"));
        // Nested objects are replaced, not merged
        assert_eq!(member.get("plan"), Some(&json!({ "tier": "silver" })));
    }

    #[test]
    fn test_leading_id_keeps_field_order() {
        let entity = Entity::new().with("name", "Ann").with("id", "old").with("age", 30);
        let entity = entity.with_leading_id("ann".to_string());

        assert_eq!(entity.keys(), vec!["id", "name", "age"]);
        assert_eq!(entity.id(), Some("ann"));
    }

    #[test]
    fn test_has_id_rejects_empty_and_non_string() {
        assert!(!Entity::new().has_id());
        assert!(!Entity::new().with("id", "").has_id());
        assert!(!Entity::new().with("id", 7).has_id());
        assert!(Entity::new().with("id", "x").has_id());
    }
}
