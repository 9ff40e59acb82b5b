mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::auth::AuthMiddleware;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Fail fast on incomplete configuration; there are no fallback secrets
    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting Storefront Service...");
    log::info!("📊 Database: {}", config.database_url);

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());
    let config_data = web::Data::new(config.clone());

    log::info!("✅ MongoDB connected successfully");

    let host = config.host.clone();
    let port = config.port.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000") // React frontend
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Users: registration, session, profile, cart, checkout, queries
            .service(
                web::scope("/api/users")
                    .route("/create", web::post().to(api::users::create_user))
                    .route("/login", web::post().to(api::users::login_user))
                    .route("/logout", web::post().to(api::users::logout_user))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::user())
                            .route("/profile", web::get().to(api::users::get_profile))
                            .route("/update", web::put().to(api::users::update_profile))
                            .route("/cart/add", web::post().to(api::users::add_to_cart))
                            .route("/cart", web::get().to(api::users::get_cart))
                            .route(
                                "/cart/{product_id}",
                                web::delete().to(api::users::remove_from_cart),
                            )
                            .route("/create-order", web::post().to(api::orders::create_order))
                            .route("/mine", web::get().to(api::orders::my_orders))
                            .route("/query", web::post().to(api::users::submit_query)),
                    ),
            )
            // Admin: identity plus back-office listings
            .service(
                web::scope("/api/admin")
                    .route("/create-admin", web::post().to(api::admin::create_admin))
                    .route("/admin-login", web::post().to(api::admin::admin_login))
                    .route("/admin-logout", web::post().to(api::admin::admin_logout))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::admin())
                            .route("/admin-profile", web::get().to(api::admin::admin_profile))
                            .route("/all-users", web::get().to(api::admin::all_users))
                            .route("/users/{id}", web::delete().to(api::admin::delete_user))
                            .route("/all-orders", web::get().to(api::orders::all_orders))
                            .route(
                                "/orders/{id}/status",
                                web::put().to(api::orders::update_order_status),
                            )
                            .route("/all-queries", web::get().to(api::admin::all_queries)),
                    ),
            )
            // Products: catalog CRUD and search
            .service(
                web::scope("/api/products")
                    .route("/create", web::post().to(api::products::create_product))
                    .route(
                        "/getallproducts",
                        web::get().to(api::products::get_all_products),
                    )
                    .route("/getproduct/{id}", web::get().to(api::products::get_product))
                    .route(
                        "/updateproducts/{id}",
                        web::put().to(api::products::update_product),
                    )
                    .route(
                        "/deleteproducts/{id}",
                        web::delete().to(api::products::delete_product),
                    )
                    .route("/search", web::get().to(api::products::search_products))
                    .service(
                        web::resource("/admin/all")
                            .wrap(AuthMiddleware::admin())
                            .route(web::get().to(api::products::admin_all_products)),
                    ),
            )
            // Payment: gateway order creation and signature verification
            .service(
                web::scope("/api/payment")
                    .route(
                        "/create-razorpay-order",
                        web::post().to(api::payment::create_razorpay_order),
                    )
                    .service(
                        web::resource("/verify-razorpay-payment")
                            .wrap(AuthMiddleware::admin())
                            .route(web::post().to(api::payment::verify_razorpay_payment)),
                    ),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
