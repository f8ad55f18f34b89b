//! PokeAPI HTTP client
//!
//! All requests funnel through a cache-first fetch path: the raw response
//! body is stored in the shared [`Cache`] keyed by URL, and repeat requests
//! within the cache interval never touch the network.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::cache::Cache;
use crate::data::{LocationArea, LocationAreaPage, Pokemon};

/// Base URL for the public PokeAPI
const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Errors that can occur when talking to PokeAPI
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// Response body (live or cached) did not parse as the expected JSON
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for fetching PokeAPI resources through the response cache
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    cache: Cache,
}

impl ApiClient {
    /// Creates a client against the public PokeAPI using the given cache
    pub fn new(cache: Cache) -> Self {
        Self::with_base_url(POKEAPI_BASE_URL, cache)
    }

    /// Creates a client against a custom base URL
    ///
    /// Used by tests to point the client at a mock server.
    pub fn with_base_url(base_url: impl Into<String>, cache: Cache) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            cache,
        }
    }

    /// Fetches the first page of the location-area listing, or the exact
    /// page at `page_url` when following pagination links.
    pub async fn location_areas(
        &self,
        page_url: Option<&str>,
    ) -> Result<LocationAreaPage, ApiError> {
        let url = match page_url {
            Some(url) => url.to_string(),
            None => format!("{}/location-area/", self.base_url),
        };
        self.fetch_json(&url).await
    }

    /// Fetches a single location area by name
    pub async fn location_area(&self, name: &str) -> Result<LocationArea, ApiError> {
        let url = format!("{}/location-area/{}", self.base_url, name);
        self.fetch_json(&url).await
    }

    /// Fetches a full Pokémon record by name
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        let url = format!("{}/pokemon/{}", self.base_url, name.to_lowercase());
        self.fetch_json(&url).await
    }

    /// Fetches raw sprite bytes from an absolute URL
    pub async fn sprite(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        self.fetch_bytes(url).await
    }

    /// Cache-first fetch of a URL's raw body bytes
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        if let Some(bytes) = self.cache.get(url) {
            debug!(url, "cache hit");
            return Ok(bytes);
        }

        debug!(url, "cache miss, fetching");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await?.to_vec();
        self.cache.add(url, body.clone());
        Ok(body)
    }

    /// Cache-first fetch decoded as JSON
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_cache() -> Cache {
        Cache::new(Duration::from_secs(600))
    }

    const PAGE_JSON: &str = r#"{
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {"name": "pallet-town-area", "url": "https://pokeapi.co/api/v2/location-area/1/"},
            {"name": "viridian-forest-area", "url": "https://pokeapi.co/api/v2/location-area/2/"}
        ]
    }"#;

    #[tokio::test]
    async fn test_location_areas_fetches_and_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/location-area/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PAGE_JSON)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url(), test_cache());
        let page = client
            .location_areas(None)
            .await
            .expect("Fetch should succeed");

        mock.assert_async().await;
        assert_eq!(page.count, 2);
        assert_eq!(page.results[0].name, "pallet-town-area");
    }

    #[tokio::test]
    async fn test_repeat_request_is_served_from_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/location-area/")
            .with_status(200)
            .with_body(PAGE_JSON)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url(), test_cache());
        client
            .location_areas(None)
            .await
            .expect("First fetch should succeed");
        let page = client
            .location_areas(None)
            .await
            .expect("Second fetch should be served from cache");

        // The mock only allows one hit; a second network call would fail
        // the expect(1) assertion.
        mock.assert_async().await;
        assert_eq!(page.results.len(), 2);
    }

    #[tokio::test]
    async fn test_clients_sharing_a_cache_share_responses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/location-area/")
            .with_status(200)
            .with_body(PAGE_JSON)
            .expect(1)
            .create_async()
            .await;

        let cache = test_cache();
        let first = ApiClient::with_base_url(server.url(), cache.clone());
        let second = ApiClient::with_base_url(server.url(), cache);

        first
            .location_areas(None)
            .await
            .expect("Fetch should succeed");
        second
            .location_areas(None)
            .await
            .expect("Fetch should hit the shared cache");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_maps_to_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pokemon/missingno")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url(), test_cache());
        let result = client.pokemon("missingno").await;

        match result {
            Err(ApiError::Status { status, .. }) => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("Expected status error, got {:?}", other.map(|p| p.name)),
        }
    }

    #[tokio::test]
    async fn test_error_responses_are_not_cached() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pokemon/flaky")
            .with_status(500)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url(), test_cache());
        assert!(client.pokemon("flaky").await.is_err());

        let recovered = server
            .mock("GET", "/pokemon/flaky")
            .with_status(200)
            .with_body(r#"{"id": 7, "name": "flaky", "base_experience": 60, "height": 5, "weight": 90}"#)
            .create_async()
            .await;

        // The failure must not poison the cache; the retry reaches the
        // server and succeeds.
        let pokemon = client
            .pokemon("flaky")
            .await
            .expect("Retry should succeed once the server recovers");
        recovered.assert_async().await;
        assert_eq!(pokemon.name, "flaky");
    }

    #[tokio::test]
    async fn test_garbage_body_maps_to_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pokemon/garbled")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url(), test_cache());
        let result = client.pokemon("garbled").await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_pokemon_name_is_lowercased() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pokemon/pikachu")
            .with_status(200)
            .with_body(r#"{"id": 25, "name": "pikachu", "base_experience": 112, "height": 4, "weight": 60}"#)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url(), test_cache());
        let pokemon = client
            .pokemon("Pikachu")
            .await
            .expect("Fetch should succeed");

        mock.assert_async().await;
        assert_eq!(pokemon.name, "pikachu");
    }
}
