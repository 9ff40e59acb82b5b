use actix_web::{web, HttpResponse};

use crate::{
    config::AppConfig,
    database::MongoDB,
    middleware::auth::{auth_cookie, expired_cookie, Principal},
    services::auth_service::{self, AdminProfile, LoginRequest, RegisterAdminRequest, Role},
    services::{query_service, user_service},
    utils::error::AppError,
};

pub async fn create_admin(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<RegisterAdminRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /admin/create-admin - email: {}", request.email);

    let admin = auth_service::register_admin(&db, &request).await?;
    let id = admin
        .id
        .ok_or_else(|| AppError::Database("inserted admin has no id".to_string()))?;
    let token = auth_service::generate_token(&id, Role::Admin, &config.jwt_secret)?;
    let profile: AdminProfile = admin.into();

    Ok(HttpResponse::Created()
        .cookie(auth_cookie(token))
        .json(serde_json::json!({ "success": true, "admin": profile })))
}

#[utoipa::path(
    post,
    path = "/api/admin/admin-login",
    tag = "Admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, auth cookie set", body = AdminProfile),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn admin_login(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /admin/admin-login - email: {}", request.email);

    let admin = auth_service::login_admin(&db, &request).await?;
    let id = admin
        .id
        .ok_or_else(|| AppError::Database("stored admin has no id".to_string()))?;
    let token = auth_service::generate_token(&id, Role::Admin, &config.jwt_secret)?;
    let profile: AdminProfile = admin.into();

    log::info!("✅ Admin login successful: {}", request.email);

    Ok(HttpResponse::Ok()
        .cookie(auth_cookie(token))
        .json(serde_json::json!({ "success": true, "admin": profile })))
}

pub async fn admin_logout() -> HttpResponse {
    log::info!("👋 POST /admin/admin-logout");

    HttpResponse::Ok()
        .cookie(expired_cookie())
        .json(serde_json::json!({ "success": true, "message": "logged out" }))
}

pub async fn admin_profile(
    principal: web::ReqData<Principal>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let profile = auth_service::get_admin_profile(&db, &principal.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "admin": profile })))
}

pub async fn all_users(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let response = user_service::list_users(&db).await?;

    Ok(HttpResponse::Ok().json(response))
}

// Hard delete, unlike the product soft delete
pub async fn delete_user(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    log::info!("🗑️ DELETE /admin/users/{}", user_id);

    user_service::delete_user(&db, &user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": "user deleted" })))
}

pub async fn all_queries(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let response = query_service::all_queries(&db).await?;

    Ok(HttpResponse::Ok().json(response))
}
