//! Downstream service stand-in for benchmark runs.
//!
//! Serves the three product facets with deterministic payloads derived from
//! the product id, a product CRUD surface backed by an in-memory map, and a
//! small runtime-config surface for latency windows and failure injection.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{debug_handler, Json, Router};
use fanbench_core::{
    InventoryResponse, NewProduct, PricingResponse, Product, ReviewsResponse,
};
use rand::Rng;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Behavior knobs for the service. The latency window applies to every
/// endpoint; failure sets target individual (facet, id) pairs.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub latency_ms: (u64, u64),
    pub fail_inventory: HashSet<u64>,
    pub fail_pricing: HashSet<u64>,
    pub fail_reviews: HashSet<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_ms: (50, 150),
            fail_inventory: HashSet::new(),
            fail_pricing: HashSet::new(),
            fail_reviews: HashSet::new(),
        }
    }
}

impl MockConfig {
    /// No artificial latency. Keeps test runs fast.
    pub fn instant() -> Self {
        Self {
            latency_ms: (0, 0),
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<RwLock<MockConfig>>,
    products: Arc<RwLock<HashMap<u64, Product>>>,
    next_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            products: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn router(config: MockConfig) -> Router {
    let state = AppState::new(config);
    Router::new()
        .route("/api/health", get(health))
        .route("/api/inventory/:id", get(inventory))
        .route("/api/pricing/:id", get(pricing))
        .route("/api/reviews/:id", get(reviews))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/:id", get(get_product))
        .route("/api/config/latency", post(set_latency))
        .route("/api/config/fail/:facet/:id", post(inject_failure))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, config: MockConfig) {
    axum::serve(listener, router(config)).await.unwrap();
}

pub async fn run(addr: SocketAddr) {
    run_with(addr, MockConfig::default()).await;
}

pub async fn run_with(addr: SocketAddr, config: MockConfig) {
    let listener = TcpListener::bind(&addr).await.unwrap();
    info!(%addr, "mock service listening");
    serve(listener, config).await;
}

/// Sleeps for a random duration inside the configured latency window, then
/// reports whether this (facet, id) pair has a failure injected.
async fn delay_and_check(
    state: &AppState,
    facet: &'static str,
    id: u64,
) -> Result<(), StatusCode> {
    let (window, failed) = {
        let config = state.config.read().await;
        let failed = match facet {
            "inventory" => config.fail_inventory.contains(&id),
            "pricing" => config.fail_pricing.contains(&id),
            "reviews" => config.fail_reviews.contains(&id),
            _ => false,
        };
        (config.latency_ms, failed)
    };

    let (min, max) = window;
    if max > 0 {
        let delay = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            max
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if failed {
        debug!(facet, id, "injected failure");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(())
}

/// Readiness probe. Skips the latency window so callers can poll it tightly.
#[debug_handler]
pub async fn health() -> &'static str {
    "ok"
}

/** Facet handlers **/

#[debug_handler]
pub async fn inventory(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<InventoryResponse>, StatusCode> {
    delay_and_check(&state, "inventory", id).await?;
    Ok(Json(InventoryResponse {
        product_id: id,
        stock_count: (id * 37 % 1000) as u32,
        warehouse_location: format!("Warehouse-{}", (b'A' + (id % 5) as u8) as char),
    }))
}

#[debug_handler]
pub async fn pricing(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PricingResponse>, StatusCode> {
    delay_and_check(&state, "pricing", id).await?;
    Ok(Json(PricingResponse {
        product_id: id,
        current_price: 10.0 + (id * 31 % 990) as f64,
        discount_percent: (id * 7 % 300) as f64 / 10.0,
    }))
}

#[debug_handler]
pub async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ReviewsResponse>, StatusCode> {
    delay_and_check(&state, "reviews", id).await?;
    Ok(Json(ReviewsResponse {
        product_id: id,
        average_rating: 1.0 + (id % 40) as f64 / 10.0,
        review_count: (id * 13 % 5000) as u32,
    }))
}

/** Product CRUD handlers **/

#[debug_handler]
pub async fn create_product(
    State(state): State<AppState>,
    Json(new): Json<NewProduct>,
) -> Result<Json<Product>, StatusCode> {
    delay_and_check(&state, "products", 0).await?;
    let id = state.next_id.fetch_add(1, Ordering::Relaxed);
    let product = Product {
        id,
        name: new.name,
        description: new.description,
        price: new.price,
        created_at_ms: now_ms(),
    };
    state.products.write().await.insert(id, product.clone());
    Ok(Json(product))
}

#[debug_handler]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Product>, StatusCode> {
    delay_and_check(&state, "products", id).await?;
    state
        .products
        .read()
        .await
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[debug_handler]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    delay_and_check(&state, "products", 0).await?;
    let mut products: Vec<Product> = state.products.read().await.values().cloned().collect();
    products.sort_by_key(|p| p.id);
    Ok(Json(products))
}

/** Runtime config handlers **/

#[derive(Deserialize)]
pub struct LatencyWindow {
    min: u64,
    max: u64,
}

#[debug_handler]
pub async fn set_latency(
    State(state): State<AppState>,
    Query(window): Query<LatencyWindow>,
) -> Result<(), StatusCode> {
    if window.max < window.min {
        return Err(StatusCode::BAD_REQUEST);
    }
    state.config.write().await.latency_ms = (window.min, window.max);
    info!(min = window.min, max = window.max, "latency window updated");
    Ok(())
}

#[debug_handler]
pub async fn inject_failure(
    State(state): State<AppState>,
    Path((facet, id)): Path<(String, u64)>,
) -> Result<(), StatusCode> {
    let mut config = state.config.write().await;
    let set = match facet.as_str() {
        "inventory" => &mut config.fail_inventory,
        "pricing" => &mut config.fail_pricing,
        "reviews" => &mut config.fail_reviews,
        _ => return Err(StatusCode::BAD_REQUEST),
    };
    set.insert(id);
    info!(facet, id, "failure injected");
    Ok(())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
