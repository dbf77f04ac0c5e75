use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    achievements::{
        create_achievement, delete_achievement, get_achievement, get_achievements,
        update_achievement,
    },
    health::health_check,
    users::{create_user, delete_user, get_user, get_users},
};
use crate::schemas::{ApiDoc, AppState};

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        // Achievement CRUD routes
        .route("/api/v1/achievements", post(create_achievement))
        .route("/api/v1/achievements", get(get_achievements))
        .route("/api/v1/achievements/:achievement_id", get(get_achievement))
        .route("/api/v1/achievements/:achievement_id", put(update_achievement))
        .route(
            "/api/v1/achievements/:achievement_id",
            delete(delete_achievement),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
