use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Catalog categories. Support queries must name one of these.
pub const CATEGORIES: &[&str] = &[
    "Electronics",
    "Fashion",
    "Footwear",
    "Accessories",
    "Home",
    "Beauty",
    "Sports",
    "Grocery",
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Bullet points shown on the product page. Never empty.
    pub description: Vec<String>,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub stock: i64,
    pub brand: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub discount: f64,
    pub sku: String,
    #[serde(default)]
    pub rating: f64,
    /// Soft-delete marker. Inactive products stay in storage but are hidden
    /// from the customer-facing endpoints.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

fn default_is_active() -> bool {
    true
}
