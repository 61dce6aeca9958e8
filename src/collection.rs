//! Hydra Paged Collections
//!
//! Both the prefixed (`hydra:member`) and the unprefixed (`member`)
//! spellings of the Hydra vocabulary are accepted.

use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// One page of a resource collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagedCollection<T = Resource> {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "hydra:member", alias = "member", default)]
    pub members: Vec<T>,

    #[serde(
        rename = "hydra:totalItems",
        alias = "totalItems",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_items: Option<u64>,

    #[serde(
        rename = "hydra:view",
        alias = "view",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub view: Option<PartialView>,
}

/// Pagination links of a collection page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialView {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "hydra:first", alias = "first", default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,

    #[serde(rename = "hydra:last", alias = "last", default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,

    #[serde(rename = "hydra:next", alias = "next", default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    #[serde(
        rename = "hydra:previous",
        alias = "previous",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub previous: Option<String>,
}

/// Pagination relation names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    First,
    Last,
    Next,
    Previous,
}

impl<T> PagedCollection<T> {
    /// Page identifier for a pagination relation, when advertised
    pub fn link(&self, relation: Relation) -> Option<&str> {
        let view = self.view.as_ref()?;
        let link = match relation {
            Relation::First => &view.first,
            Relation::Last => &view.last,
            Relation::Next => &view.next,
            Relation::Previous => &view.previous,
        };
        link.as_deref()
    }
}

impl PagedCollection<Resource> {
    /// IRIs of the members of this page, in order
    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().filter_map(Resource::iri).collect()
    }
}
