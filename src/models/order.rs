use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    Processing,
    Confirmed,
    Delivered,
    Cancelled,
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Processing" => Ok(OrderStatus::Processing),
            "Confirmed" => Ok(OrderStatus::Confirmed),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    Cod,
    Online,
}

impl FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(PaymentMethod::Cod),
            "Online" => Ok(PaymentMethod::Online),
            _ => Err(()),
        }
    }
}

/// One purchased line. `unit_price` is captured when the order is created, so
/// historical orders keep the price that was actually paid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: ObjectId,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Gateway confirmation attached by payment verification.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentInfo {
    pub payment_id: String,
    pub payment_status: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    /// Immutable once the order is created.
    pub items: Vec<OrderItem>,
    pub full_name: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parses_known_values_only() {
        assert_eq!("Processing".parse(), Ok(OrderStatus::Processing));
        assert_eq!("Confirmed".parse(), Ok(OrderStatus::Confirmed));
        assert_eq!("Delivered".parse(), Ok(OrderStatus::Delivered));
        assert_eq!("Cancelled".parse(), Ok(OrderStatus::Cancelled));
        assert!("Shipped".parse::<OrderStatus>().is_err());
        assert!("processing".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_method_parses_cod_and_online() {
        assert_eq!("COD".parse(), Ok(PaymentMethod::Cod));
        assert_eq!("Online".parse(), Ok(PaymentMethod::Online));
        assert!("Card".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_status_defaults_to_processing() {
        assert_eq!(OrderStatus::default(), OrderStatus::Processing);
    }
}
