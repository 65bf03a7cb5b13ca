//! reqwest-backed listing client

use super::CatalogSource;
use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::types::{CatalogItem, CatalogPage, ItemId};
use async_trait::async_trait;
use serde::Deserialize;

/// Listing response body
#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    total: Option<u64>,
    #[serde(rename = "totalHits", default)]
    total_hits: Option<u64>,
    hits: Vec<ListingHit>,
}

/// One hit as the listing endpoint spells it
#[derive(Debug, Deserialize)]
struct ListingHit {
    id: u64,
    #[serde(rename = "webformatURL")]
    webformat_url: String,
    #[serde(rename = "largeImageURL")]
    large_image_url: String,
    #[serde(default)]
    user: String,
    #[serde(default)]
    tags: String,
}

impl From<ListingHit> for CatalogItem {
    fn from(hit: ListingHit) -> Self {
        Self {
            id: ItemId(hit.id),
            preview_url: hit.webformat_url,
            full_url: hit.large_image_url,
            owner: hit.user,
            tags: hit.tags,
        }
    }
}

/// Listing client for a Pixabay-compatible endpoint
///
/// Sends `key`, `page`, `per_page`, `image_type`, `orientation` and
/// `category` as query parameters and decodes `{ hits: [...] }`.
pub struct HttpCatalogClient {
    http_client: reqwest::Client,
    config: CatalogConfig,
}

impl HttpCatalogClient {
    /// Create a client from catalog settings
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn query(&self, page: u32, per_page: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }
        params.push(("page", page.to_string()));
        params.push(("per_page", per_page.to_string()));
        params.push(("image_type", self.config.image_type.clone()));
        params.push(("orientation", self.config.orientation.clone()));
        params.push(("category", self.config.category.clone()));
        params
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn list(&self, page: u32, per_page: u32) -> Result<CatalogPage> {
        if page == 0 || per_page == 0 {
            return Err(Error::InvalidArgument(format!(
                "page ({page}) and per_page ({per_page}) must be at least 1"
            )));
        }

        let response = self
            .http_client
            .get(&self.config.base_url)
            .query(&self.query(page, per_page))
            .send()
            .await?;

        if !response.status().is_success() {
            // The request URL carries the credential, so report the bare endpoint.
            return Err(Error::Http {
                status: response.status().as_u16(),
                url: self.config.base_url.clone(),
            });
        }

        let body: ListingResponse = response.json().await?;

        Ok(CatalogPage {
            page,
            items: body.hits.into_iter().map(CatalogItem::from).collect(),
            total_hits: body.total_hits.or(body.total),
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fetch_page;
    use crate::types::FetchFailureKind;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpCatalogClient {
        HttpCatalogClient::new(CatalogConfig {
            base_url: format!("{}/api/", server.uri()),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn listing_body() -> serde_json::Value {
        serde_json::json!({
            "total": 4692,
            "totalHits": 500,
            "hits": [
                {
                    "id": 195893,
                    "pageURL": "https://pixabay.com/en/blossom-bloom-flower-195893/",
                    "type": "photo",
                    "tags": "blossom, bloom, flower",
                    "webformatURL": "https://cdn.example/195893_640.jpg",
                    "largeImageURL": "https://cdn.example/195893_1280.jpg",
                    "user": "Josch13",
                    "likes": 575
                },
                {
                    "id": 73424,
                    "tags": "sky clouds",
                    "webformatURL": "https://cdn.example/73424_640.png",
                    "largeImageURL": "https://cdn.example/73424_1280.png",
                    "user": "Hans"
                }
            ]
        })
    }

    #[tokio::test]
    async fn sends_fixed_filters_and_decodes_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .and(query_param("key", "test-key"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "20"))
            .and(query_param("image_type", "photo"))
            .and(query_param("orientation", "vertical"))
            .and(query_param("category", "backgrounds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server).list(2, 20).await.unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.total_hits, Some(500));
        assert_eq!(page.len(), 2);
        assert_eq!(page.items[0].id, ItemId(195893));
        assert_eq!(page.items[0].preview_url, "https://cdn.example/195893_640.jpg");
        assert_eq!(page.items[0].full_url, "https://cdn.example/195893_1280.jpg");
        assert_eq!(page.items[0].owner, "Josch13");
        assert_eq!(page.items[1].tags, "sky clouds");
    }

    #[tokio::test]
    async fn error_status_is_reported_without_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("[ERROR 400] Invalid API key"))
            .mount(&server)
            .await;

        let err = client_for(&server).list(1, 20).await.unwrap_err();
        match err {
            Error::Http { status, url } => {
                assert_eq!(status, 400);
                assert!(!url.contains("test-key"));
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let fetch = fetch_page(&client, 1, 20).await;

        assert_eq!(fetch.failure(), Some(FetchFailureKind::Decode));
        assert!(fetch.into_page().is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_transport_failure() {
        // Bind then drop so the port is very likely closed.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let client = HttpCatalogClient::new(CatalogConfig {
            base_url: format!("http://{addr}/api/"),
            ..Default::default()
        })
        .unwrap();

        let fetch = fetch_page(&client, 1, 20).await;
        assert_eq!(fetch.failure(), Some(FetchFailureKind::Transport));
    }

    #[tokio::test]
    async fn missing_key_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"hits": []})))
            .mount(&server)
            .await;

        let client = HttpCatalogClient::new(CatalogConfig {
            base_url: format!("{}/api/", server.uri()),
            ..Default::default()
        })
        .unwrap();
        let page = client.list(1, 5).await.unwrap();
        assert!(page.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].url.query_pairs().any(|(k, _)| k == "key"));
    }
}
