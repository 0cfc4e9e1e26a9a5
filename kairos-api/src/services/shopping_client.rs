//! Shopping search client (SerpAPI)
//!
//! One text query in, the top `max_results` product records out. A non-200
//! answer degrades to an empty list; transport and parse failures are errors.

use kairos_common::Product;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::ShoppingConfig;

const USER_AGENT: &str = concat!("kairos-api/", env!("CARGO_PKG_VERSION"));

/// Shopping client errors
#[derive(Debug, Error)]
pub enum ShoppingError {
    #[error("Shopping API key not configured. Set KAIROS_SERPAPI_API_KEY or [shopping] api_key")]
    MissingApiKey,

    #[error("Shopping network error: {0}")]
    NetworkError(String),

    #[error("Shopping parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    shopping_results: Vec<ShoppingResult>,
}

/// Raw result record; any field may be absent or null upstream
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ShoppingResult {
    title: Option<String>,
    price: Option<String>,
    thumbnail: Option<String>,
    link: Option<String>,
    product_link: Option<String>,
}

impl From<ShoppingResult> for Product {
    fn from(r: ShoppingResult) -> Self {
        Product {
            title: r.title.unwrap_or_default(),
            price: r.price.unwrap_or_default(),
            thumbnail: r.thumbnail.unwrap_or_default(),
            link: r.link.or(r.product_link).unwrap_or_default(),
        }
    }
}

/// Shopping search API client
pub struct ShoppingClient {
    http_client: reqwest::Client,
    api_base: String,
    engine: String,
    max_results: usize,
    api_key: Option<String>,
}

impl ShoppingClient {
    pub fn new(config: &ShoppingConfig, timeout: Duration) -> Result<Self, ShoppingError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ShoppingError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            engine: config.engine.clone(),
            max_results: config.max_results,
            api_key: config.api_key.clone(),
        })
    }

    /// Search for products matching `query`
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, ShoppingError> {
        let api_key = self.api_key.as_deref().ok_or(ShoppingError::MissingApiKey)?;
        let url = format!("{}/search.json", self.api_base);

        tracing::debug!(query = %query, url = %url, "Querying shopping API");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("engine", self.engine.as_str()),
                ("q", query),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(|e| ShoppingError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(
                query = %query,
                status = status.as_u16(),
                "Shopping search failed, returning no products"
            );
            return Ok(Vec::new());
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ShoppingError::ParseError(e.to_string()))?;

        let products: Vec<Product> = body
            .shopping_results
            .into_iter()
            .take(self.max_results)
            .map(Product::from)
            .collect();

        tracing::info!(query = %query, count = products.len(), "Retrieved shopping results");
        Ok(products)
    }
}
