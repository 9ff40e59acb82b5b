use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    middleware::auth::Principal,
    services::order_service::{self, CreateOrderRequest, OrderResponse, UpdateStatusRequest},
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/api/users/create-order",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created; cart cleared when it was the source"),
        (status = 400, description = "Missing delivery field, malformed reference, or empty cart"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Referenced product no longer exists")
    )
)]
pub async fn create_order(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🧾 POST /users/create-order - user: {}", principal.id.to_hex());

    let order = order_service::create_order(&db, &principal.id, &request).await?;

    Ok(HttpResponse::Created().json(OrderResponse {
        success: true,
        order,
    }))
}

pub async fn my_orders(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let response = order_service::my_orders(&db, &principal.id).await?;

    Ok(HttpResponse::Ok().json(response))
}

// Admin: every order in the system, newest first
pub async fn all_orders(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let response = order_service::all_orders(&db).await?;

    Ok(HttpResponse::Ok().json(response))
}

// Admin: status transition
pub async fn update_order_status(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    request: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    log::info!("🔄 PUT /admin/orders/{}/status -> {}", order_id, request.status);

    let order = order_service::update_status(&db, &order_id, &request).await?;

    Ok(HttpResponse::Ok().json(OrderResponse {
        success: true,
        order,
    }))
}
