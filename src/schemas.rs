use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::mailer::Mailer;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Outbound mail port for achievement notifications
    pub mailer: Arc<dyn Mailer>,
    /// Public base URL used to build achievement links in notifications
    pub base_url: String,
}

/// Query parameters for the achievement list endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct AchievementListQuery {
    /// Single letter; restricts the list to titles starting with it
    /// (case-insensitive) and orders the result by the author's email
    pub starts_with: Option<String>,
    /// When true, non-public achievements are left out
    pub public_only: Option<bool>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Validation failure response. Every failed rule is listed so the caller
/// can display all problems at once.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    /// User-facing message per failed rule
    pub errors: Vec<String>,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::delete_user,
        crate::handlers::achievements::create_achievement,
        crate::handlers::achievements::get_achievements,
        crate::handlers::achievements::get_achievement,
        crate::handlers::achievements::update_achievement,
        crate::handlers::achievements::delete_achievement,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::users::UserResponse>,
            ApiResponse<crate::handlers::achievements::AchievementResponse>,
            ErrorResponse,
            ValidationErrorResponse,
            HealthResponse,
            AchievementListQuery,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::achievements::CreateAchievementRequest,
            crate::handlers::achievements::UpdateAchievementRequest,
            crate::handlers::achievements::AchievementResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "achievements", description = "Achievement posting and browsing endpoints"),
    ),
    info(
        title = "Kudos API",
        description = "A small service for posting and browsing personal achievements",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
