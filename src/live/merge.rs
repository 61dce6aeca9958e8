//! Merge rules for pushed representations
//!
//! A pushed message carries a full or partial resource. Items take it on
//! top of their current value; collections update, remove or append the
//! matching member.

use crate::collection::PagedCollection;
use crate::resource::Resource;
use std::collections::HashSet;

/// Something a live view can display and keep up to date
pub trait LiveState: Clone + Send + Sync + 'static {
    /// IRIs to subscribe to
    fn topics(&self) -> Vec<String>;

    /// Merge a pushed representation; returns whether anything changed
    fn apply(&mut self, update: Resource) -> bool;
}

/// A single displayed resource; `None` once deleted
impl LiveState for Option<Resource> {
    fn topics(&self) -> Vec<String> {
        self.as_ref()
            .and_then(Resource::iri)
            .map(|iri| vec![iri.to_string()])
            .unwrap_or_default()
    }

    fn apply(&mut self, update: Resource) -> bool {
        let Some(current) = self.as_mut() else {
            return false;
        };
        if current.iri().is_none() || current.iri() != update.iri() {
            return false;
        }

        if update.is_deletion() {
            *self = None;
        } else {
            current.overlay(update);
        }
        true
    }
}

/// The members of a displayed page
impl LiveState for Vec<Resource> {
    fn topics(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.iter()
            .filter_map(Resource::iri)
            .filter(|iri| seen.insert(*iri))
            .map(str::to_string)
            .collect()
    }

    fn apply(&mut self, update: Resource) -> bool {
        let Some(iri) = update.iri() else {
            return false;
        };

        let position = self.iter().position(|m| m.iri() == Some(iri));
        match (position, update.is_deletion()) {
            (Some(index), true) => {
                self.remove(index);
            }
            (Some(index), false) => self[index].overlay(update),
            (None, true) => return false,
            (None, false) => self.push(update),
        }
        true
    }
}

/// A whole page; the total item count follows removals and appends
impl LiveState for PagedCollection<Resource> {
    fn topics(&self) -> Vec<String> {
        self.members.topics()
    }

    fn apply(&mut self, update: Resource) -> bool {
        let before = self.members.len();
        if !self.members.apply(update) {
            return false;
        }

        let after = self.members.len();
        if let Some(total) = self.total_items.as_mut() {
            if after > before {
                *total += 1;
            } else if after < before {
                *total = total.saturating_sub(1);
            }
        }
        true
    }
}
