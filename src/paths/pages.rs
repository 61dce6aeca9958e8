//! Page walk
//!
//! A lazy, finite stream over the pages of a collection. It yields the
//! already-fetched first page, then follows `next` links one request at a
//! time. A stream cannot be restarted; walking again means fetching page 1
//! again.

use crate::collection::{PagedCollection, Relation};
use crate::fetch::{ApiClient, FetchError, RequestOptions};
use futures_util::stream::{self, Stream};
use std::collections::HashSet;

struct Walk {
    pending: Option<PagedCollection>,
    next_link: Option<String>,
    visited: HashSet<String>,
}

/// Stream every page of a collection, starting with `first`
///
/// Ends at the first page without a `next` link, or when a `next` link
/// points back to a page already visited. The first failed fetch is
/// yielded as an error and ends the stream.
pub fn pages(
    client: &ApiClient,
    first: PagedCollection,
) -> impl Stream<Item = Result<PagedCollection, FetchError>> + '_ {
    let mut visited = HashSet::new();
    if let Some(id) = first.view.as_ref().and_then(|v| v.id.clone()) {
        visited.insert(id);
    }

    let walk = Walk {
        pending: Some(first),
        next_link: None,
        visited,
    };

    stream::try_unfold(walk, move |mut walk| async move {
        let page = match walk.pending.take() {
            Some(page) => page,
            None => match walk.next_link.take() {
                Some(link) => {
                    tracing::debug!(page = %link, "Fetching next collection page");
                    client
                        .request::<PagedCollection>(&link, RequestOptions::get())
                        .await?
                        .data
                }
                None => return Ok(None),
            },
        };

        walk.next_link = page
            .link(Relation::Next)
            .filter(|next| walk.visited.insert(next.to_string()))
            .map(str::to_string);

        Ok::<_, FetchError>(Some((page, walk)))
    })
}
