use actix_web::{web, HttpResponse};

use crate::{
    config::AppConfig,
    database::MongoDB,
    middleware::auth::{auth_cookie, expired_cookie, Principal},
    services::auth_service::{self, LoginRequest, RegisterUserRequest, Role, UserProfile},
    services::query_service::{self, SubmitQueryRequest},
    services::user_service::{self, AddToCartRequest, UpdateProfileRequest},
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/api/users/create",
    tag = "Users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered, auth cookie set", body = UserProfile),
        (status = 400, description = "Missing required field"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /users/create - email: {}", request.email);

    let user = auth_service::register_user(&db, &request).await?;
    let id = user
        .id
        .ok_or_else(|| AppError::Database("inserted user has no id".to_string()))?;
    let token = auth_service::generate_token(&id, Role::User, &config.jwt_secret)?;
    let profile: UserProfile = user.into();

    Ok(HttpResponse::Created()
        .cookie(auth_cookie(token))
        .json(serde_json::json!({ "success": true, "user": profile })))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, auth cookie set", body = UserProfile),
        (status = 401, description = "Invalid credentials, no cookie set")
    )
)]
pub async fn login_user(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /users/login - email: {}", request.email);

    let user = auth_service::login_user(&db, &request).await?;
    let id = user
        .id
        .ok_or_else(|| AppError::Database("stored user has no id".to_string()))?;
    let token = auth_service::generate_token(&id, Role::User, &config.jwt_secret)?;
    let profile: UserProfile = user.into();

    log::info!("✅ Login successful: {}", request.email);

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(token))
        .json(serde_json::json!({ "success": true, "user": profile })))
}

// Stateless: only the cookie is cleared, an already-captured token stays
// valid until it expires.
pub async fn logout_user() -> HttpResponse {
    log::info!("👋 POST /users/logout");

    HttpResponse::Ok()
        .cookie(expired_cookie())
        .json(serde_json::json!({ "success": true, "message": "logged out" }))
}

pub async fn get_profile(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let profile = user_service::get_profile(&db, &principal.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "user": profile })))
}

pub async fn update_profile(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("✏️  PUT /users/update - user: {}", principal.id.to_hex());

    let profile = user_service::update_profile(&db, &principal.id, &request).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "user": profile })))
}

#[utoipa::path(
    post,
    path = "/api/users/cart/add",
    tag = "Cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Line added or quantity incremented"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product missing or inactive")
    )
)]
pub async fn add_to_cart(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    request: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "🛒 POST /users/cart/add - user: {} product: {}",
        principal.id.to_hex(),
        request.product_id
    );

    let cart = user_service::add_to_cart(&db, &principal.id, &request).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "cart": cart })))
}

pub async fn get_cart(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let response = user_service::get_cart(&db, &principal.id).await?;

    Ok(HttpResponse::Ok().json(response))
}

pub async fn remove_from_cart(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    log::info!(
        "🛒 DELETE /users/cart/{} - user: {}",
        product_id,
        principal.id.to_hex()
    );

    let cart = user_service::remove_from_cart(&db, &principal.id, &product_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "cart": cart })))
}

pub async fn submit_query(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
    request: web::Json<SubmitQueryRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("💬 POST /users/query - user: {}", principal.id.to_hex());

    let query = query_service::submit_query(&db, &principal.id, &request).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "query": query })))
}
