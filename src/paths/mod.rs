//! Page-Path Resolver
//!
//! Works out how many pages a collection has and which admin routes exist
//! for it: one per page, and one per resource.

mod pages;

pub use pages::pages;

use crate::collection::{PagedCollection, Relation};
use crate::fetch::{ApiClient, FetchError};
use crate::resource::{iri_last_segment, ResourceDescriptor};
use futures_util::TryStreamExt;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Number of pages of a collection, never less than 1
///
/// With a known total the count is `ceil(total / page_size)`, where the page
/// size is `fixed_page_size` when given, else the member count of `page`.
/// Without a total, the page number of the `last` link is used.
pub fn page_count(page: &PagedCollection, fixed_page_size: Option<u64>) -> u64 {
    let size = fixed_page_size
        .filter(|size| *size > 0)
        .unwrap_or(page.members.len() as u64);

    let count = match page.total_items {
        Some(total) if size > 0 => total.div_ceil(size),
        _ => page.link(Relation::Last).map(page_number).unwrap_or(1),
    };

    count.max(1)
}

/// One route per page, `[page]` replaced by 1..=page count
pub fn collection_paths(
    first_page: &PagedCollection,
    fixed_page_size: Option<u64>,
    template: &str,
) -> Vec<String> {
    (1..=page_count(first_page, fixed_page_size))
        .map(|page| template.replace("[page]", &page.to_string()))
        .collect()
}

/// One route per distinct resource across every page
///
/// Pages are fetched sequentially after `first_page`; any failed fetch
/// fails the whole enumeration.
pub async fn item_paths(
    client: &ApiClient,
    first_page: PagedCollection,
    template: &str,
) -> Result<Vec<String>, FetchError> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    let mut walk = Box::pin(pages(client, first_page));
    while let Some(page) = walk.try_next().await? {
        for iri in page.member_ids() {
            if seen.insert(iri.to_string()) {
                paths.push(item_path(iri, template));
            }
        }
    }

    tracing::debug!(count = paths.len(), template = %template, "Resolved item paths");
    Ok(paths)
}

/// Route for one resource: `[id]` replaced by the last IRI segment
pub fn item_path(iri: &str, template: &str) -> String {
    if iri.is_empty() {
        return String::new();
    }
    template.replace("[id]", iri_last_segment(iri))
}

/// Page number of a collection path such as `/heroes?page=3`
///
/// Returns 1 when the path is not a page of `resource_name` or carries no
/// usable page number.
pub fn parse_page(resource_name: &str, path: &str) -> u64 {
    let pattern = format!(
        r"(?:^|/){}/?\?(?:[^#]*&)?page=(\d+)(?:[&#]|$)",
        regex::escape(resource_name.trim_matches('/'))
    );
    let Ok(re) = Regex::new(&pattern) else {
        return 1;
    };

    re.captures(path)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

/// Admin route of the page a collection link points to
pub fn page_route(descriptor: &ResourceDescriptor, link: &str) -> String {
    descriptor
        .page_route_template()
        .replace("[page]", &parse_page(descriptor.collection, link).to_string())
}

fn page_number(link: &str) -> u64 {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"[?&]page=(\d+)(?:[&#]|$)").expect("page pattern is valid")
    });

    re.captures(link)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}
