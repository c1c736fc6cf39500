use std::net::SocketAddr;
use std::sync::Arc;

use kisan_server::{
    assistant::GeminiAssistant, build_router, config, db, state::AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kisan_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::Settings::new().expect("Failed to load settings");

    let db = db::Database::new(&settings.database.path).expect("Failed to create database");
    db.initialize().expect("Failed to initialize database schema");
    db.seed_reference_data()
        .expect("Failed to seed schemes and market prices");
    tracing::info!("Database initialized at {}", settings.database.path);

    tokio::fs::create_dir_all(&settings.uploads.dir)
        .await
        .expect("Failed to create upload directory");

    if settings.assistant.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; Krishi Mitra will answer with the fallback reply");
    }
    let assistant = Arc::new(GeminiAssistant::new(&settings.assistant));

    let state = AppState::new(
        db,
        settings.session.ttl_days,
        assistant,
        &settings.uploads.dir,
    );

    match state.session_manager.cleanup_expired_sessions() {
        Ok(count) => tracing::info!("Removed {} expired sessions on startup", count),
        Err(e) => tracing::error!("Failed to cleanup expired sessions on startup: {}", e),
    }

    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if let Err(e) = cleanup_state.session_manager.cleanup_expired_sessions() {
                tracing::error!("Periodic session cleanup failed: {}", e);
            }
        }
    });

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .expect("Failed to parse server address");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
