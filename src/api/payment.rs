use actix_web::{web, HttpResponse};

use crate::{
    config::AppConfig,
    database::MongoDB,
    services::order_service::OrderResponse,
    services::payment_service::{self, CreateGatewayOrderRequest, GatewayOrder, VerifyPaymentRequest},
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/api/payment/create-razorpay-order",
    tag = "Payment",
    request_body = CreateGatewayOrderRequest,
    responses(
        (status = 200, description = "Gateway order created", body = GatewayOrder),
        (status = 400, description = "Non-positive amount"),
        (status = 500, description = "Gateway unreachable or rejected the request")
    )
)]
pub async fn create_razorpay_order(
    config: web::Data<AppConfig>,
    request: web::Json<CreateGatewayOrderRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("💳 POST /payment/create-razorpay-order - amount: {}", request.amount);

    let order = payment_service::create_gateway_order(&config, &request).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "order": order })))
}

#[utoipa::path(
    post,
    path = "/api/payment/verify-razorpay-payment",
    tag = "Payment",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 201, description = "Signature genuine, order recorded as paid"),
        (status = 400, description = "Signature verification failed, nothing persisted"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn verify_razorpay_payment(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "💳 POST /payment/verify-razorpay-payment - gateway order: {}",
        request.razorpay_order_id
    );

    let order = payment_service::verify_payment(&db, &config, &request).await?;

    log::info!("✅ Payment verified: {}", request.razorpay_payment_id);

    Ok(HttpResponse::Created().json(OrderResponse {
        success: true,
        order,
    }))
}
