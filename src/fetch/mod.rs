//! Resource Fetcher
//!
//! Talks to the Hydra API and normalizes its answers.
//!
//! ## Architecture
//!
//! - **ApiClient**: one network call per [`ApiClient::request`]
//! - **FetchError**: network, HTTP (status, message, field violations), decode
//! - **Hub discovery**: live-update hub read from the `Link` header
//! - **QueryCache**: reads keyed by method and path, invalidated by writes
//!
//! ## Example
//!
//! ```rust,no_run
//! use hydra_admin::config::ApiConfig;
//! use hydra_admin::fetch::ApiClient;
//! use hydra_admin::resource::HERO;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ApiConfig::with_entrypoint("https://demo.api-platform.com")?)?;
//! let page = client.get_collection(&HERO, None).await?;
//! println!("{} heroes, hub: {:?}", page.data.members.len(), page.hub_url);
//! # Ok(())
//! # }
//! ```

mod cache;
mod client;
mod error;
mod hub;
mod resources;
mod response;

pub use cache::{CacheKey, QueryCache, DEFAULT_CAPACITY as DEFAULT_CACHE_CAPACITY};
pub use client::{ApiClient, MIME_TYPE};
pub use error::FetchError;
pub use hub::extract_hub_url;
pub use response::{FetchResponse, RequestOptions};
