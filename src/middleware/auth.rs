use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use mongodb::bson::oid::ObjectId;
use std::future::{ready, Ready};

use crate::{
    config::AppConfig,
    services::auth_service::{self, Role},
    utils::error::AppError,
};

pub const TOKEN_COOKIE: &str = "token";

/// The authenticated caller, decoded from the token cookie and attached to
/// request extensions. Handlers receive it via `web::ReqData<Principal>`.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: ObjectId,
    pub role: Role,
}

/// HTTP-only auth cookie carrying the signed token. User and admin flows use
/// identical attributes.
pub fn auth_cookie(token: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::days(auth_service::TOKEN_TTL_DAYS))
        .finish()
}

/// Immediately-expiring replacement, set by logout.
pub fn expired_cookie() -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::ZERO)
        .finish()
}

/// Rejects requests whose cookie token is missing, invalid, expired, or
/// carries the wrong role.
pub struct AuthMiddleware {
    required: Role,
}

impl AuthMiddleware {
    pub fn user() -> Self {
        Self {
            required: Role::User,
        }
    }

    pub fn admin() -> Self {
        Self {
            required: Role::Admin,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            required: self.required,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    required: Role,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match req.cookie(TOKEN_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => {
                return Box::pin(async move {
                    Err(AppError::Unauthorized("authentication token missing".to_string()).into())
                });
            }
        };

        let secret = match req.app_data::<web::Data<AppConfig>>() {
            Some(config) => config.jwt_secret.clone(),
            None => {
                return Box::pin(async move {
                    Err(AppError::Database("configuration not available".to_string()).into())
                });
            }
        };

        let claims = match auth_service::verify_token(&token, &secret) {
            Ok(claims) => claims,
            Err(e) => return Box::pin(async move { Err(e.into()) }),
        };

        if claims.role != self.required {
            return Box::pin(async move {
                Err(AppError::Unauthorized("insufficient privileges".to_string()).into())
            });
        }

        let id = match ObjectId::parse_str(&claims.sub) {
            Ok(id) => id,
            Err(_) => {
                return Box::pin(async move {
                    Err(AppError::InvalidToken("malformed subject".to_string()).into())
                });
            }
        };

        req.extensions_mut().insert(Principal {
            id,
            role: claims.role,
        });

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}
