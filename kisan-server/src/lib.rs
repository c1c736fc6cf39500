// Library exports for kisan-server
// The binary and the integration tests both build the router from here

pub mod api;
pub mod assistant;
pub mod config;
pub mod db;
pub mod diagnosis;
pub mod middleware;
pub mod password;
pub mod session;
pub mod state;
pub mod views;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use state::AppState;

/// Largest accepted request body, photos included
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the full application router.
///
/// Everything except the login, registration and static routes sits
/// behind [`middleware::require_session`].
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(api::dashboard::dashboard))
        .route("/weather", get(api::dashboard::weather))
        // Crop doctor
        .route("/scan", get(api::scan::scan_page).post(api::scan::analyze))
        .route("/analyze", post(api::scan::analyze))
        // Community feed
        .route(
            "/community",
            get(api::community::feed).post(api::community::create_post),
        )
        .route("/community/:id/comment", post(api::community::create_comment))
        .route("/community/:id/like", post(api::community::like_post))
        .route("/community/:id/image", get(api::community::post_image))
        // Marketplace
        .route(
            "/market",
            get(api::market::listings).post(api::market::create_listing),
        )
        .route("/market/:id/image", get(api::market::product_image))
        // Reference directories
        .route("/schemes", get(api::directory::schemes))
        .route("/prices", get(api::directory::prices))
        // Krishi Mitra
        .route(
            "/assistant",
            get(api::assistant::chat_page).post(api::assistant::send_message),
        )
        .route("/assistant/analyze", post(api::assistant::analyze_photo))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    // Uploaded files are served as-is; browsers must not sniff them into HTML
    let uploads = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .service(ServeDir::new(&state.upload_dir));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::assets::health_check))
        .route("/static/style.css", get(api::assets::stylesheet))
        .nest_service("/static/uploads", uploads)
        .route("/", get(api::auth::login_page).post(api::auth::login))
        .route("/login", get(api::auth::login_page).post(api::auth::login))
        .route(
            "/register",
            get(api::auth::register_page).post(api::auth::register),
        )
        .route("/logout", get(api::auth::logout))
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
