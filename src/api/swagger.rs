use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Service API",
        version = "1.0.0",
        description = "REST backend for the storefront. \n\n**Authentication:** protected endpoints read a signed token from the HTTP-only `token` cookie set by the login endpoints.\n\n**Features:**\n- User and admin authentication\n- Product catalog with soft delete and search\n- Per-user cart and checkout\n- Payment gateway order creation and signature verification",
        contact(
            name = "Storefront Service Team",
            email = "support@storefront-service.com"
        )
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Users & cart
        crate::api::users::create_user,
        crate::api::users::login_user,
        crate::api::users::add_to_cart,

        // Admin
        crate::api::admin::admin_login,

        // Products
        crate::api::products::create_product,
        crate::api::products::get_all_products,
        crate::api::products::search_products,

        // Orders
        crate::api::orders::create_order,

        // Payment
        crate::api::payment::create_razorpay_order,
        crate::api::payment::verify_razorpay_payment,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::services::auth_service::RegisterUserRequest,
            crate::services::auth_service::RegisterAdminRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::UserProfile,
            crate::services::auth_service::AdminProfile,
            crate::services::user_service::AddToCartRequest,
            crate::services::product_service::CreateProductRequest,
            crate::services::order_service::CreateOrderRequest,
            crate::services::order_service::OrderItemInput,
            crate::services::payment_service::CreateGatewayOrderRequest,
            crate::services::payment_service::GatewayOrder,
            crate::services::payment_service::VerifyPaymentRequest,
        )
    ),
    tags(
        (name = "Health", description = "Service status."),
        (name = "Users", description = "Registration, login, and profile for customers. Login sets the auth cookie."),
        (name = "Cart", description = "Per-user cart operations."),
        (name = "Orders", description = "Checkout and order history."),
        (name = "Admin", description = "Admin authentication and back-office listings."),
        (name = "Products", description = "Catalog CRUD, soft delete, and search."),
        (name = "Payment", description = "Gateway order creation and payment signature verification."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
        }
    }
}
