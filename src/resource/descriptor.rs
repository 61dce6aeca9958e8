//! Resource descriptor table
//!
//! One entry per resource type exposed by the API. Routes, endpoint paths,
//! form fields and client-side validation are all derived from here.

use super::{FieldErrors, Resource};
use reqwest::Url;
use serde_json::Value;

/// How a field's raw input is parsed and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Url,
    Integer,
    Boolean,
}

/// A form field of a resource
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Checked locally before a write is sent
    pub required: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Static description of a resource type
#[derive(Debug)]
pub struct ResourceDescriptor {
    /// Display name and JSON-LD type (e.g. "Hero")
    pub name: &'static str,
    /// API collection segment (e.g. "heroes")
    pub collection: &'static str,
    /// Base of the admin routes (e.g. "/heros")
    pub route_base: &'static str,
    pub fields: &'static [FieldSpec],
}

pub static HERO: ResourceDescriptor = ResourceDescriptor {
    name: "Hero",
    collection: "heroes",
    route_base: "/heros",
    fields: &[FieldSpec::new("name", FieldKind::Text)],
};

pub static LOCATION: ResourceDescriptor = ResourceDescriptor {
    name: "Location",
    collection: "locations",
    route_base: "/locations",
    fields: &[
        FieldSpec::new("name", FieldKind::Text),
        FieldSpec::new("city", FieldKind::Text),
        FieldSpec::new("state", FieldKind::Text),
        FieldSpec::new("photo", FieldKind::Url),
        FieldSpec::new("availableUnits", FieldKind::Integer),
        FieldSpec::new("wifi", FieldKind::Boolean),
        FieldSpec::new("laundry", FieldKind::Boolean),
    ],
};

pub static DESCRIPTORS: &[&ResourceDescriptor] = &[&HERO, &LOCATION];

/// Look a descriptor up by display name, API collection or route segment
pub fn descriptor(name: &str) -> Option<&'static ResourceDescriptor> {
    let name = name.trim_matches('/');
    DESCRIPTORS.iter().copied().find(|d| {
        d.name.eq_ignore_ascii_case(name)
            || d.collection.eq_ignore_ascii_case(name)
            || d.route_base.trim_start_matches('/').eq_ignore_ascii_case(name)
    })
}

impl ResourceDescriptor {
    /// API path of the collection, optionally for a given page
    pub fn collection_path(&self, page: Option<u64>) -> String {
        match page {
            Some(page) => format!("/{}?page={}", self.collection, page),
            None => format!("/{}", self.collection),
        }
    }

    /// IRI for an identifier; full IRIs are passed through
    pub fn item_iri(&self, id: &str) -> String {
        if id.starts_with('/') || id.contains("://") {
            id.to_string()
        } else {
            format!("/{}/{}", self.collection, id)
        }
    }

    pub fn list_route(&self) -> String {
        self.route_base.to_string()
    }

    pub fn create_route(&self) -> String {
        format!("{}/create", self.route_base)
    }

    pub fn page_route_template(&self) -> String {
        format!("{}/page/[page]", self.route_base)
    }

    pub fn show_route_template(&self) -> String {
        format!("{}/[id]", self.route_base)
    }

    pub fn edit_route_template(&self) -> String {
        format!("{}/[id]/edit", self.route_base)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Screen title: `Edit Hero /heroes/1` or `Create Hero`
    pub fn form_title(&self, resource: Option<&Resource>) -> String {
        match resource.and_then(Resource::iri) {
            Some(iri) => format!("Edit {} {}", self.name, iri),
            None => format!("Create {}", self.name),
        }
    }

    /// Parse raw form input for a field according to its kind
    ///
    /// Empty input clears non-text fields.
    pub fn parse_field(&self, name: &str, raw: &str) -> Result<Value, String> {
        let spec = self
            .field(name)
            .ok_or_else(|| format!("Unknown field \"{}\" for {}.", name, self.name))?;
        let raw_trimmed = raw.trim();

        if raw_trimmed.is_empty() && spec.kind != FieldKind::Text {
            return Ok(Value::Null);
        }

        match spec.kind {
            FieldKind::Text => Ok(Value::String(raw.to_string())),
            FieldKind::Url => Url::parse(raw_trimmed)
                .map(|_| Value::String(raw_trimmed.to_string()))
                .map_err(|_| "This value is not a valid URL.".to_string()),
            FieldKind::Integer => raw_trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "This value should be of type int.".to_string()),
            FieldKind::Boolean => parse_bool(raw_trimmed)
                .map(Value::Bool)
                .ok_or_else(|| "This value should be of type bool.".to_string()),
        }
    }

    /// Client-side validation: required fields and value types
    pub fn validate(&self, resource: &Resource) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for spec in self.fields {
            let value = resource.get(spec.name).unwrap_or(&Value::Null);
            let blank = match value {
                Value::Null => true,
                Value::String(s) => s.trim().is_empty(),
                _ => false,
            };

            if blank {
                if spec.required {
                    errors.insert(
                        spec.name.to_string(),
                        "This value should not be blank.".to_string(),
                    );
                }
                continue;
            }

            let message = match (spec.kind, value) {
                (FieldKind::Text, Value::String(_)) => None,
                (FieldKind::Url, Value::String(s)) if Url::parse(s).is_ok() => None,
                (FieldKind::Url, _) => Some("This value is not a valid URL."),
                (FieldKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => None,
                (FieldKind::Integer, _) => Some("This value should be of type int."),
                (FieldKind::Boolean, Value::Bool(_)) => None,
                (FieldKind::Boolean, _) => Some("This value should be of type bool."),
                (FieldKind::Text, _) => Some("This value should be of type string."),
            };
            if let Some(message) = message {
                errors.insert(spec.name.to_string(), message.to_string());
            }
        }

        errors
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup() {
        assert_eq!(descriptor("Hero").map(|d| d.collection), Some("heroes"));
        assert_eq!(descriptor("heroes").map(|d| d.name), Some("Hero"));
        assert_eq!(descriptor("/heros").map(|d| d.name), Some("Hero"));
        assert_eq!(descriptor("locations").map(|d| d.name), Some("Location"));
        assert!(descriptor("villains").is_none());
    }

    #[test]
    fn test_paths_and_routes() {
        assert_eq!(HERO.collection_path(None), "/heroes");
        assert_eq!(HERO.collection_path(Some(3)), "/heroes?page=3");
        assert_eq!(HERO.item_iri("5"), "/heroes/5");
        assert_eq!(HERO.item_iri("/heroes/5"), "/heroes/5");
        assert_eq!(HERO.list_route(), "/heros");
        assert_eq!(HERO.create_route(), "/heros/create");
        assert_eq!(HERO.page_route_template(), "/heros/page/[page]");
        assert_eq!(HERO.edit_route_template(), "/heros/[id]/edit");
        assert_eq!(LOCATION.show_route_template(), "/locations/[id]");
    }

    #[test]
    fn test_form_title() {
        let hero = Resource::with_id("/heroes/1");
        assert_eq!(HERO.form_title(Some(&hero)), "Edit Hero /heroes/1");
        assert_eq!(HERO.form_title(None), "Create Hero");
        assert_eq!(HERO.form_title(Some(&Resource::draft())), "Create Hero");
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(LOCATION.parse_field("name", "Gotham"), Ok(json!("Gotham")));
        assert_eq!(LOCATION.parse_field("availableUnits", " 12 "), Ok(json!(12)));
        assert_eq!(LOCATION.parse_field("wifi", "yes"), Ok(json!(true)));
        assert_eq!(LOCATION.parse_field("laundry", ""), Ok(Value::Null));
        assert_eq!(
            LOCATION.parse_field("photo", "https://img.example.com/a.png"),
            Ok(json!("https://img.example.com/a.png"))
        );
        assert!(LOCATION.parse_field("availableUnits", "many").is_err());
        assert!(LOCATION.parse_field("wifi", "maybe").is_err());
        assert!(LOCATION.parse_field("photo", "not a url").is_err());
        assert!(HERO.parse_field("city", "x").is_err());
    }

    #[test]
    fn test_validate_types() {
        let location = Resource::draft()
            .field("name", "Wayne Manor")
            .field("availableUnits", "lots")
            .field("wifi", true);

        let errors = LOCATION.validate(&location);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("availableUnits").map(String::as_str),
            Some("This value should be of type int.")
        );
    }

    #[test]
    fn test_validate_required() {
        static STRICT: ResourceDescriptor = ResourceDescriptor {
            name: "Strict",
            collection: "stricts",
            route_base: "/stricts",
            fields: &[FieldSpec::new("name", FieldKind::Text).required()],
        };

        let errors = STRICT.validate(&Resource::draft().field("name", "  "));
        assert_eq!(
            errors.get("name").map(String::as_str),
            Some("This value should not be blank.")
        );
        assert!(STRICT.validate(&Resource::draft().field("name", "ok")).is_empty());
        // optional fields may stay empty
        assert!(LOCATION.validate(&Resource::draft()).is_empty());
    }
}
