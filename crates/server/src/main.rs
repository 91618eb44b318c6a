//! Makaan-rs server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use makaan_api::{middleware::AppState, router as api_router};
use makaan_common::Config;
use makaan_core::{
    AuthService, BlockingService, CatalogService, HmacPaymentVerifier, HttpSmsSender,
    ModerationService, NoOpPaymentVerifier, NoOpSms, OrderService, PaymentVerifier, PostService,
    ProductService, ProjectService, SearchService, SmsSender, UserService, VisibilityService,
};
use makaan_db::repositories::{
    BrandRepository, CategoryRepository, FlagRepository, OrderRepository, PostRepository,
    ProductRepository, ProjectRepository, UserBlockRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "makaan=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting makaan-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = makaan_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    makaan_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let block_repo = UserBlockRepository::new(Arc::clone(&db));
    let flag_repo = FlagRepository::new(Arc::clone(&db));
    let project_repo = ProjectRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let product_repo = ProductRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let brand_repo = BrandRepository::new(Arc::clone(&db));
    let order_repo = OrderRepository::new(Arc::clone(&db));

    // External collaborators
    let sms: Arc<dyn SmsSender> = match config.sms {
        Some(ref sms_config) => {
            info!(gateway = %sms_config.gateway_url, "SMS gateway configured");
            Arc::new(HttpSmsSender::new(sms_config))
        }
        None => {
            info!("No SMS gateway configured, OTP delivery disabled");
            Arc::new(NoOpSms)
        }
    };
    let payment: Arc<dyn PaymentVerifier> = match config.payment {
        Some(ref payment_config) => Arc::new(HmacPaymentVerifier::new(payment_config)),
        None => {
            info!("No payment gateway configured, signature checks disabled");
            Arc::new(NoOpPaymentVerifier)
        }
    };

    // Initialize services
    let visibility = VisibilityService::new(block_repo.clone());
    let auth_service = AuthService::new(user_repo.clone(), sms, config.auth.otp_ttl_secs);
    let user_service = UserService::new(
        user_repo.clone(),
        project_repo.clone(),
        product_repo.clone(),
        visibility.clone(),
    );
    let blocking_service = BlockingService::new(block_repo, user_repo.clone());
    let moderation_service = ModerationService::new(
        flag_repo,
        user_repo.clone(),
        project_repo.clone(),
        post_repo.clone(),
        product_repo.clone(),
    );
    let search_service = SearchService::new(
        category_repo.clone(),
        brand_repo.clone(),
        product_repo.clone(),
        project_repo.clone(),
        user_repo.clone(),
        visibility.clone(),
    );
    let project_service =
        ProjectService::new(project_repo, user_repo.clone(), visibility.clone());
    let post_service = PostService::new(post_repo, visibility.clone());
    let product_service =
        ProductService::new(product_repo.clone(), brand_repo.clone(), visibility);
    let catalog_service = CatalogService::new(category_repo, brand_repo);
    let order_service = OrderService::new(order_repo, product_repo, payment);

    // Create app state
    let state = AppState {
        auth_service,
        user_service,
        blocking_service,
        moderation_service,
        search_service,
        project_service,
        post_service,
        product_service,
        catalog_service,
        order_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            makaan_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
