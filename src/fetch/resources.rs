//! Resource operations
//!
//! Descriptor-driven reads and writes shared by every resource type. Reads
//! go through the query cache; successful writes invalidate the owning
//! collection and the written item.

use super::cache::CacheKey;
use super::{ApiClient, FetchError, FetchResponse, RequestOptions};
use crate::collection::PagedCollection;
use crate::resource::{Resource, ResourceDescriptor};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

impl ApiClient {
    /// GET through the query cache
    pub async fn cached_get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<FetchResponse<T>, FetchError> {
        let key = CacheKey::get(self.cache_path(path)?);

        let response = match self.cache.get(&key).await {
            Some(hit) => {
                tracing::trace!(path = %key.path, "Query cache hit");
                hit
            }
            None => {
                let fresh: FetchResponse<Value> = self.request(path, RequestOptions::get()).await?;
                self.cache.insert(key, fresh.clone()).await;
                fresh
            }
        };

        let FetchResponse {
            data,
            status,
            hub_url,
            text,
        } = response;
        Ok(FetchResponse {
            data: serde_json::from_value(data)?,
            status,
            hub_url,
            text,
        })
    }

    /// One page of a resource collection (`None` for the default first page)
    pub async fn get_collection(
        &self,
        descriptor: &ResourceDescriptor,
        page: Option<u64>,
    ) -> Result<FetchResponse<PagedCollection>, FetchError> {
        self.cached_get(&descriptor.collection_path(page)).await
    }

    /// A single resource by identifier or IRI
    ///
    /// A 404 yields `Ok(None)` so callers can render a not-found page.
    pub async fn get_item(
        &self,
        descriptor: &ResourceDescriptor,
        id: &str,
    ) -> Result<Option<FetchResponse<Resource>>, FetchError> {
        match self.cached_get(&descriptor.item_iri(id)).await {
            Ok(response) => Ok(Some(response)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create (POST to the collection) or update (PUT to the IRI)
    pub async fn save(
        &self,
        descriptor: &ResourceDescriptor,
        resource: &Resource,
    ) -> Result<FetchResponse<Resource>, FetchError> {
        let (path, method) = match resource.iri() {
            Some(iri) => (iri.to_string(), Method::PUT),
            None => (descriptor.collection_path(None), Method::POST),
        };

        let options = RequestOptions::method(method.clone()).json(resource)?;
        let response: FetchResponse<Resource> = self.request(&path, options).await?;

        tracing::info!(
            resource = descriptor.name,
            method = %method,
            id = response.data.iri().unwrap_or("-"),
            "Resource saved"
        );

        self.invalidate_after_write(descriptor, resource.iri()).await?;
        if let Some(iri) = response.data.iri() {
            self.cache.invalidate(&self.cache_path(iri)?).await;
        }

        Ok(response)
    }

    /// Delete a resource by identifier or IRI
    pub async fn delete(
        &self,
        descriptor: &ResourceDescriptor,
        id: &str,
    ) -> Result<(), FetchError> {
        let iri = descriptor.item_iri(id);
        self.request::<()>(&iri, RequestOptions::method(Method::DELETE))
            .await?;

        tracing::info!(resource = descriptor.name, id = %iri, "Resource deleted");

        self.invalidate_after_write(descriptor, Some(&iri)).await
    }

    async fn invalidate_after_write(
        &self,
        descriptor: &ResourceDescriptor,
        iri: Option<&str>,
    ) -> Result<(), FetchError> {
        let collection = self.cache_path(&descriptor.collection_path(None))?;
        self.cache.invalidate_collection(&collection).await;
        if let Some(iri) = iri {
            self.cache.invalidate(&self.cache_path(iri)?).await;
        }
        Ok(())
    }
}
