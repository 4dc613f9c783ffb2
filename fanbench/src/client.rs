use crate::aggregate::FacetSource;
use async_trait::async_trait;
use fanbench_core::{
    BenchError, InventoryResponse, NewProduct, PricingResponse, Product, ReviewsResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::info;

/// Facet reads over HTTP against the downstream service.
pub struct HttpFacetSource {
    client: Client,
    base_url: String,
}

impl HttpFacetSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BenchError> {
        get_json(&self.client, &self.base_url, path).await
    }
}

#[async_trait]
impl FacetSource for HttpFacetSource {
    async fn inventory(&self, product_id: u64) -> Result<InventoryResponse, BenchError> {
        self.get_json(&format!("/api/inventory/{product_id}")).await
    }

    async fn pricing(&self, product_id: u64) -> Result<PricingResponse, BenchError> {
        self.get_json(&format!("/api/pricing/{product_id}")).await
    }

    async fn reviews(&self, product_id: u64) -> Result<ReviewsResponse, BenchError> {
        self.get_json(&format!("/api/reviews/{product_id}")).await
    }
}

/// Client for the product CRUD surface; also drives seeding.
pub struct ProductClient {
    client: Client,
    base_url: String,
}

impl ProductClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, BenchError> {
        let url = format!("{}/api/products", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(product)
            .send()
            .await
            .map_err(|err| BenchError::CallFailure(err.to_string()))?;
        if !response.status().is_success() {
            return Err(BenchError::CallFailure(format!(
                "POST {url}: status {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|err| BenchError::CallFailure(err.to_string()))
    }

    pub async fn get(&self, id: u64) -> Result<Product, BenchError> {
        get_json(&self.client, &self.base_url, &format!("/api/products/{id}")).await
    }

    pub async fn list(&self) -> Result<Vec<Product>, BenchError> {
        get_json(&self.client, &self.base_url, "/api/products").await
    }

    /// Stores `count` baseline products. Seeding is additive: a second call
    /// stores another batch, it never upserts.
    pub async fn seed(&self, count: usize) -> Result<(), BenchError> {
        info!(count, "seeding products");
        for i in 1..=count {
            let product = NewProduct {
                name: format!("Product {i}"),
                description: format!("Description for product {i}"),
                price: 10.0 + (i % 99) as f64 * 10.0,
            };
            self.create(&product)
                .await
                .map_err(|err| BenchError::Seeding(err.to_string()))?;
        }
        info!("seeding complete");
        Ok(())
    }
}

/// Polls the service health endpoint until it answers or the deadline
/// passes. Used after spawning an in-process mock instead of a fixed sleep.
pub async fn wait_until_healthy(base_url: &str, deadline: Duration) -> Result<(), BenchError> {
    let client = Client::new();
    let url = format!("{base_url}/api/health");
    let start = Instant::now();
    loop {
        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            _ if start.elapsed() >= deadline => {
                return Err(BenchError::CallFailure(format!(
                    "GET {url}: service not ready within {deadline:?}"
                )));
            }
            _ => tokio::time::sleep(Duration::from_millis(25)).await,
        }
    }
}

async fn get_json<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    path: &str,
) -> Result<T, BenchError> {
    let url = format!("{base_url}{path}");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|err| BenchError::CallFailure(err.to_string()))?;
    if !response.status().is_success() {
        return Err(BenchError::CallFailure(format!(
            "GET {url}: status {}",
            response.status()
        )));
    }
    response
        .json()
        .await
        .map_err(|err| BenchError::CallFailure(err.to_string()))
}
