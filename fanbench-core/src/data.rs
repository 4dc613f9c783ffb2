use serde::{Deserialize, Serialize};

/// Stock facet: count plus warehouse label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryResponse {
    pub product_id: u64,
    pub stock_count: u32,
    pub warehouse_location: String,
}

/// Price facet: current price plus discount percentage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingResponse {
    pub product_id: u64,
    pub current_price: f64,
    pub discount_percent: f64,
}

/// Rating facet: average rating plus review count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewsResponse {
    pub product_id: u64,
    pub average_rating: f64,
    pub review_count: u32,
}

/// The combined record of all three facets for one entity.
///
/// Every field is required; an aggregate with any facet missing must surface
/// as a failure, never as a record with substitute values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub product_id: u64,
    pub stock_count: u32,
    pub warehouse_location: String,
    pub current_price: f64,
    pub discount_percent: f64,
    pub average_rating: f64,
    pub review_count: u32,
}

impl AggregateRecord {
    pub fn combine(
        product_id: u64,
        inventory: InventoryResponse,
        pricing: PricingResponse,
        reviews: ReviewsResponse,
    ) -> Self {
        Self {
            product_id,
            stock_count: inventory.stock_count,
            warehouse_location: inventory.warehouse_location,
            current_price: pricing.current_price,
            discount_percent: pricing.discount_percent,
            average_rating: reviews.average_rating,
            review_count: reviews.review_count,
        }
    }
}

/// Stored product entity, as returned by the CRUD surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at_ms: u64,
}

/// Payload for creating a product; the store assigns id and timestamp.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
}
