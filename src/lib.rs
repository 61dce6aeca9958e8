//! # Hydra Admin
//!
//! Client-side core of an admin for Hydra (JSON-LD) APIs: fetching resources,
//! resolving the routes to render for them, and keeping displayed resources
//! up to date through the API's live-update hub.
//!
//! ## Modules
//!
//! - [`fetch`]: HTTP client, error mapping, hub discovery and query cache
//! - [`paths`]: page counts, page routes and item routes of a collection
//! - [`live`]: live-update subscriptions and merge rules
//! - [`form`]: create/edit/delete flow of a resource form
//! - [`resource`]: the resource model and the descriptor table
//! - [`collection`]: paged Hydra collections
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hydra_admin::{paths, ApiClient, Config, HERO};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = ApiClient::new(config.api)?;
//!
//!     let first = client.get_collection(&HERO, None).await?;
//!     let routes = paths::item_paths(&client, first.data, &HERO.show_route_template()).await?;
//!
//!     for route in routes {
//!         println!("{}", route);
//!     }
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod config;
pub mod fetch;
pub mod form;
pub mod live;
pub mod paths;
pub mod resource;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use collection::{PagedCollection, PartialView, Relation};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};

pub use fetch::{ApiClient, FetchError, FetchResponse, RequestOptions};

pub use form::{FormOutcome, FormStatus, ResourceForm};

pub use live::{LivePhase, LiveState, LiveView};

pub use resource::{
    descriptor, FieldErrors, FieldKind, FieldSpec, Resource, ResourceDescriptor, DESCRIPTORS,
    HERO, LOCATION,
};
