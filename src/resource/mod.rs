//! Resources
//!
//! A [`Resource`] is a JSON-LD node: an IRI, an optional type and a bag of
//! scalar fields. What fields a resource carries is described by a
//! [`ResourceDescriptor`] rather than by a dedicated struct per type, so
//! every screen and operation is written once and parameterized by the
//! descriptor table.

mod descriptor;

pub use descriptor::{
    descriptor, FieldKind, FieldSpec, ResourceDescriptor, DESCRIPTORS, HERO, LOCATION,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name → message, used for both server violations and local validation
pub type FieldErrors = BTreeMap<String, String>;

/// A single API resource (Hero, Location, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// IRI of the resource; absent for drafts that were never persisted
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// JSON-LD type (e.g. "Hero")
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Every other property, in server order
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Resource {
    /// Empty resource for "create" flows
    pub fn draft() -> Self {
        Self::default()
    }

    /// Resource known only by its IRI
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Builder-style field setter
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn iri(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Last path segment of the IRI (`/heroes/5` → `5`)
    pub fn short_id(&self) -> Option<&str> {
        self.iri().map(iri_last_segment)
    }

    /// A pushed representation carrying nothing but JSON-LD keywords
    /// announces that the resource was deleted.
    pub fn is_deletion(&self) -> bool {
        self.id.is_some() && self.fields.keys().all(|k| k.starts_with('@'))
    }

    /// Apply a full or partial representation on top of this one
    pub fn overlay(&mut self, update: Resource) {
        if update.kind.is_some() {
            self.kind = update.kind;
        }
        for (key, value) in update.fields {
            self.fields.insert(key, value);
        }
    }
}

/// Last non-empty path segment of an IRI, ignoring any query string
pub fn iri_last_segment(iri: &str) -> &str {
    let path = iri.split(['?', '#']).next().unwrap_or(iri);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

const MEMBER_KEYS: [&str; 2] = ["hydra:member", "member"];

/// Collection and document metadata, kept as sent
const ENVELOPE_KEYS: [&str; 5] = ["@context", "hydra:view", "view", "hydra:search", "search"];

/// Replace embedded nodes by their IRI
///
/// Members of a collection are normalized as resources of their own. Any
/// other top-level value (or array element) carrying an `@id` collapses to
/// that IRI, so relation fields always hold identifiers. Envelope metadata
/// such as `hydra:view` is left untouched.
pub fn normalize(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };

    let map = map
        .into_iter()
        .map(|(key, value)| {
            let value = if MEMBER_KEYS.contains(&key.as_str()) {
                match value {
                    Value::Array(members) => {
                        Value::Array(members.into_iter().map(normalize).collect())
                    }
                    other => other,
                }
            } else if ENVELOPE_KEYS.contains(&key.as_str()) {
                value
            } else {
                match value {
                    Value::Array(items) => {
                        Value::Array(items.into_iter().map(collapse_node).collect())
                    }
                    other => collapse_node(other),
                }
            };
            (key, value)
        })
        .collect();
    Value::Object(map)
}

fn collapse_node(value: Value) -> Value {
    if let Some(Value::String(id)) = value.get("@id") {
        return Value::String(id.clone());
    }
    value
}
