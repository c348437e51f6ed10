use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod router;

use shared_config::AppConfig;
use shared_models::identity::{DirectoryReader, InMemoryDirectory, PartyProfile};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareLink API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Identity read models come from the host; seed a demo directory so
    // notification payloads render names instead of ids.
    let directory = Arc::new(InMemoryDirectory::new());
    if config.seed_demo_directory {
        seed_demo_directory(&directory).await;
    }

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(directory as Arc<dyn DirectoryReader>)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = config.bind_addr();
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn seed_demo_directory(directory: &InMemoryDirectory) {
    let profiles = [
        ("Dr. Sarah Johnson", "sarah.johnson@carelink.example"),
        ("Dr. Michael Chen", "michael.chen@carelink.example"),
        ("Maria Rodriguez", "maria.rodriguez@example.com"),
        ("James Wilson", "james.wilson@example.com"),
    ];

    for (name, email) in profiles {
        directory
            .upsert(PartyProfile {
                id: Uuid::new_v4(),
                display_name: name.to_string(),
                contact_email: Some(email.to_string()),
            })
            .await;
    }

    info!("Seeded demo identity directory with {} profiles", profiles.len());
}
