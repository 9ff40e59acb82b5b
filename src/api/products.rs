use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    services::product_service::{self, CreateProductRequest, ProductResponse, UpdateProductRequest},
    utils::error::AppError,
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[utoipa::path(
    post,
    path = "/api/products/create",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Missing field or empty description"),
        (status = 409, description = "SKU already exists")
    )
)]
pub async fn create_product(
    db: web::Data<MongoDB>,
    request: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📦 POST /products/create - sku: {}", request.sku);

    let product = product_service::create_product(&db, &request).await?;

    Ok(HttpResponse::Created().json(ProductResponse {
        success: true,
        product,
    }))
}

#[utoipa::path(
    get,
    path = "/api/products/getallproducts",
    tag = "Products",
    responses(
        (status = 200, description = "Active products, newest first")
    )
)]
pub async fn get_all_products(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let response = product_service::get_all_active(&db).await?;

    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_product(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let product = product_service::get_active_by_id(&db, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ProductResponse {
        success: true,
        product,
    }))
}

pub async fn update_product(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    request: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    log::info!("✏️  PUT /products/updateproducts/{}", product_id);

    let product = product_service::update_product(&db, &product_id, &request).await?;

    Ok(HttpResponse::Ok().json(ProductResponse {
        success: true,
        product,
    }))
}

pub async fn delete_product(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    log::info!("🗑️ DELETE /products/deleteproducts/{}", product_id);

    product_service::soft_delete(&db, &product_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "product deactivated"
    })))
}

#[utoipa::path(
    get,
    path = "/api/products/search",
    tag = "Products",
    params(
        ("query" = String, Query, description = "Text to match; a numeric value also acts as a price ceiling")
    ),
    responses(
        (status = 200, description = "Matching active products")
    )
)]
pub async fn search_products(
    db: web::Data<MongoDB>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔍 GET /products/search - query: {}", params.query);

    let response = product_service::search(&db, &params.query).await?;

    Ok(HttpResponse::Ok().json(response))
}

// Admin: full catalog, soft-deleted entries included
pub async fn admin_all_products(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let response = product_service::admin_list_all(&db).await?;

    Ok(HttpResponse::Ok().json(response))
}
