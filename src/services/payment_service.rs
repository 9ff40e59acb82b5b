use crate::{
    config::AppConfig,
    database::MongoDB,
    models::Order,
    services::order_service::{self, CreateOrderRequest},
    utils::{error::AppError, signature},
};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const GATEWAY_ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateGatewayOrderRequest {
    /// Amount in currency units; forwarded to the gateway in subunits.
    pub amount: f64,
    pub currency: Option<String>,
}

/// The gateway's order record, passed back to the client so it can open the
/// checkout widget.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub status: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    /// Owner of the order being recorded.
    pub user_id: String,
    pub order: CreateOrderRequest,
}

fn to_subunits(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub async fn create_gateway_order(
    config: &AppConfig,
    request: &CreateGatewayOrderRequest,
) -> Result<GatewayOrder, AppError> {
    if request.amount <= 0.0 {
        return Err(AppError::Validation("amount must be positive".to_string()));
    }

    let currency = request.currency.clone().unwrap_or_else(|| "INR".to_string());
    let receipt = format!("rcpt_{}", Uuid::new_v4().simple());

    let client = reqwest::Client::new();
    let response = client
        .post(GATEWAY_ORDERS_URL)
        .basic_auth(&config.razorpay_key_id, Some(&config.razorpay_key_secret))
        .json(&serde_json::json!({
            "amount": to_subunits(request.amount),
            "currency": currency,
            "receipt": receipt,
        }))
        .send()
        .await
        .map_err(|e| AppError::Database(format!("gateway request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::Database(format!(
            "gateway returned {}",
            response.status()
        )));
    }

    let order = response
        .json::<GatewayOrder>()
        .await
        .map_err(|e| AppError::Database(format!("failed to parse gateway response: {}", e)))?;

    log::info!("✅ Gateway order created: {}", order.id);

    Ok(order)
}

/// Confirms the gateway really signed this payment before anything is
/// persisted. On a match the carried order payload is recorded with the
/// payment attached.
pub async fn verify_payment(
    db: &MongoDB,
    config: &AppConfig,
    request: &VerifyPaymentRequest,
) -> Result<Order, AppError> {
    let genuine = signature::verify(
        &config.razorpay_key_secret,
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
    );

    if !genuine {
        log::warn!(
            "❌ Signature verification failed for gateway order {}",
            request.razorpay_order_id
        );
        return Err(AppError::Validation(
            "signature verification failed".to_string(),
        ));
    }

    let user_id = ObjectId::parse_str(&request.user_id)
        .map_err(|_| AppError::Validation("invalid user reference".to_string()))?;

    order_service::create_paid_order(db, &user_id, &request.order, &request.razorpay_payment_id)
        .await
}
