use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::{achievement, user};
use model::validation::{validate_achievement, AchievementDraft, ValidationError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::mailer::AchievementMail;
use crate::schemas::{
    AchievementListQuery, ApiResponse, AppState, ErrorResponse, ValidationErrorResponse,
};

/// Request body for creating a new achievement
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAchievementRequest {
    /// Title (must be unique per author)
    pub title: String,
    /// Markdown description
    pub description: Option<String>,
    /// Whether the achievement is publicly visible
    #[serde(default)]
    pub is_public: bool,
    /// Cosmetic "featured" flag
    #[serde(default)]
    pub is_featured: bool,
    /// Reference to an externally stored cover image
    pub cover_image: Option<String>,
    /// Authoring user
    pub user_id: Option<i32>,
}

/// Request body for updating an achievement. Only provided fields change;
/// the owner cannot be reassigned.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateAchievementRequest {
    /// Title (must stay unique per author)
    pub title: Option<String>,
    /// Markdown description
    pub description: Option<String>,
    /// Whether the achievement is publicly visible
    pub is_public: Option<bool>,
    /// Cosmetic "featured" flag
    pub is_featured: Option<bool>,
    /// Reference to an externally stored cover image
    pub cover_image: Option<String>,
}

/// Achievement response model, including the derived display fields
#[derive(Debug, Serialize, ToSchema)]
pub struct AchievementResponse {
    pub id: i32,
    pub title: String,
    /// Markdown source text
    pub description: Option<String>,
    /// Description rendered to HTML, recomputed on every read
    pub description_html: String,
    pub is_public: bool,
    pub is_featured: bool,
    pub cover_image: Option<String>,
    pub user_id: i32,
    /// `"<title> by <owner email>"`
    pub silly_achievement: String,
    pub created_at: DateTime<Utc>,
}

impl AchievementResponse {
    fn from_model(model: achievement::Model, owner: &user::Model) -> Self {
        Self {
            description_html: model.description_html(),
            silly_achievement: model.silly_achievement(owner),
            id: model.id,
            title: model.title,
            description: model.description,
            is_public: model.is_public,
            is_featured: model.is_featured,
            cover_image: model.cover_image,
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

fn validation_failed(errors: &[ValidationError]) -> (StatusCode, Json<ValidationErrorResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorResponse {
            errors: errors.iter().map(ToString::to_string).collect(),
            code: "VALIDATION_FAILED".to_string(),
            success: false,
        }),
    )
}

fn database_error() -> (StatusCode, Json<ValidationErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ValidationErrorResponse {
            errors: vec!["internal server error".to_string()],
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}

/// Pair each achievement with its author and build response models,
/// preserving the incoming order. Authors are fetched in one query.
async fn with_owners(
    state: &AppState,
    achievements: Vec<achievement::Model>,
) -> Result<Vec<AchievementResponse>, DbErr> {
    let owner_ids: Vec<i32> = achievements.iter().map(|a| a.user_id).collect();
    let owners: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(owner_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    achievements
        .into_iter()
        .map(|a| {
            let owner = owners.get(&a.user_id).ok_or_else(|| {
                DbErr::RecordNotFound(format!("owner {} of achievement {}", a.user_id, a.id))
            })?;
            Ok(AchievementResponse::from_model(a, owner))
        })
        .collect()
}

/// Create a new achievement
///
/// Validation failures come back as a complete list so the caller can show
/// every problem at once. On success the author is congratulated by mail.
#[utoipa::path(
    post,
    path = "/api/v1/achievements",
    tag = "achievements",
    request_body = CreateAchievementRequest,
    responses(
        (status = 201, description = "Achievement created successfully", body = ApiResponse<AchievementResponse>),
        (status = 422, description = "Validation failed", body = ValidationErrorResponse),
        (status = 500, description = "Internal server error", body = ValidationErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_achievement(
    State(state): State<AppState>,
    Json(request): Json<CreateAchievementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AchievementResponse>>), (StatusCode, Json<ValidationErrorResponse>)>
{
    trace!("Entering create_achievement function");
    debug!("Creating achievement with title: {}", request.title);

    let draft = AchievementDraft {
        title: request.title.clone(),
        user_id: request.user_id,
    };
    let errors = match validate_achievement(&state.db, &draft, None).await {
        Ok(errors) => errors,
        Err(db_error) => {
            error!("Validation query failed: {}", db_error);
            return Err(database_error());
        }
    };
    if !errors.is_empty() {
        warn!("Achievement '{}' failed validation: {:?}", request.title, errors);
        return Err(validation_failed(&errors));
    }

    // Validation just confirmed the owner exists; fetch it for the
    // notification address and the response fields.
    let Some(owner_id) = request.user_id else {
        return Err(validation_failed(&[ValidationError::MissingOwner]));
    };
    let owner = match user::Entity::find_by_id(owner_id).one(&state.db).await {
        Ok(Some(owner)) => owner,
        Ok(None) => return Err(validation_failed(&[ValidationError::MissingOwner])),
        Err(db_error) => {
            error!("Failed to look up owner {}: {}", owner_id, db_error);
            return Err(database_error());
        }
    };

    let new_achievement = achievement::ActiveModel {
        title: Set(request.title.clone()),
        description: Set(request.description.clone()),
        is_public: Set(request.is_public),
        is_featured: Set(request.is_featured),
        cover_image: Set(request.cover_image.clone()),
        user_id: Set(owner.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_achievement.insert(&state.db).await {
        Ok(achievement_model) => {
            info!(
                "Achievement created successfully with ID: {}, title: {}",
                achievement_model.id, achievement_model.title
            );

            // Congratulate the author. Delivery problems must never fail
            // the request, so the error stops here.
            let mail = AchievementMail::achievement_created(
                &owner.email,
                achievement_model.id,
                &state.base_url,
            );
            if let Err(mail_error) = state.mailer.send(mail).await {
                error!("Failed to hand off achievement notification: {}", mail_error);
            }

            let response = ApiResponse {
                data: AchievementResponse::from_model(achievement_model, &owner),
                message: "Achievement has been created".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to create achievement '{}': {}",
                request.title, db_error
            );

            // A racing create can slip past validation and trip the unique
            // index instead; report it the same way.
            let error_msg = db_error.to_string().to_lowercase();
            if error_msg.contains("unique") || error_msg.contains("constraint") {
                Err(validation_failed(&[ValidationError::DuplicateTitle]))
            } else {
                Err(database_error())
            }
        }
    }
}

/// List achievements
///
/// With `starts_with`, filters to titles beginning with that letter
/// (case-insensitive) ordered by the author's email address. Without it,
/// all achievements are returned in title order. Visibility filtering is
/// opt-in via `public_only`.
#[utoipa::path(
    get,
    path = "/api/v1/achievements",
    tag = "achievements",
    params(
        ("starts_with" = Option<String>, Query, description = "Single letter to filter titles by"),
        ("public_only" = Option<bool>, Query, description = "Only return public achievements"),
    ),
    responses(
        (status = 200, description = "Achievements retrieved successfully", body = ApiResponse<Vec<AchievementResponse>>),
        (status = 400, description = "Invalid query parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_achievements(
    State(state): State<AppState>,
    Query(query): Query<AchievementListQuery>,
) -> Result<Json<ApiResponse<Vec<AchievementResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_achievements function");

    let achievements = match &query.starts_with {
        Some(letter_param) => {
            let mut chars = letter_param.chars();
            let (Some(letter), None) = (chars.next(), chars.next()) else {
                warn!("Rejecting starts_with parameter: {:?}", letter_param);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "starts_with must be a single letter".to_string(),
                        code: "INVALID_QUERY_PARAMETER".to_string(),
                        success: false,
                    }),
                ));
            };
            achievement::by_letter(&state.db, letter).await
        }
        None => {
            achievement::Entity::find()
                .order_by_asc(achievement::Column::Title)
                .all(&state.db)
                .await
        }
    };

    let mut achievements = match achievements {
        Ok(achievements) => achievements,
        Err(db_error) => {
            error!("Failed to retrieve achievements: {}", db_error);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal server error".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    // Visibility is decided here, not in the query layer.
    if query.public_only.unwrap_or(false) {
        achievements.retain(|a| a.is_public);
    }

    debug!("Retrieved {} achievements", achievements.len());

    match with_owners(&state, achievements).await {
        Ok(data) => Ok(Json(ApiResponse {
            data,
            message: "Achievements retrieved successfully".to_string(),
            success: true,
        })),
        Err(db_error) => {
            error!("Failed to resolve achievement owners: {}", db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal server error".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Get a specific achievement by ID
#[utoipa::path(
    get,
    path = "/api/v1/achievements/{achievement_id}",
    tag = "achievements",
    params(
        ("achievement_id" = i32, Path, description = "Achievement ID"),
    ),
    responses(
        (status = 200, description = "Achievement retrieved successfully", body = ApiResponse<AchievementResponse>),
        (status = 404, description = "Achievement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_achievement(
    Path(achievement_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AchievementResponse>>, StatusCode> {
    trace!(
        "Entering get_achievement function for achievement_id: {}",
        achievement_id
    );

    match achievement::Entity::find_by_id(achievement_id)
        .find_also_related(user::Entity)
        .one(&state.db)
        .await
    {
        Ok(Some((achievement_model, Some(owner)))) => {
            info!(
                "Successfully retrieved achievement with ID: {}, title: {}",
                achievement_model.id, achievement_model.title
            );
            let response = ApiResponse {
                data: AchievementResponse::from_model(achievement_model, &owner),
                message: "Achievement retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(Some((achievement_model, None))) => {
            error!(
                "Achievement {} has no owner row; data is inconsistent",
                achievement_model.id
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Ok(None) => {
            warn!("Achievement with ID {} not found", achievement_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve achievement with ID {}: {}",
                achievement_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update an achievement
///
/// The updated fields are re-validated; the duplicate-title check skips the
/// record itself. No notification is sent for updates.
#[utoipa::path(
    put,
    path = "/api/v1/achievements/{achievement_id}",
    tag = "achievements",
    params(
        ("achievement_id" = i32, Path, description = "Achievement ID"),
    ),
    request_body = UpdateAchievementRequest,
    responses(
        (status = 200, description = "Achievement updated successfully", body = ApiResponse<AchievementResponse>),
        (status = 404, description = "Achievement not found", body = ValidationErrorResponse),
        (status = 422, description = "Validation failed", body = ValidationErrorResponse),
        (status = 500, description = "Internal server error", body = ValidationErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_achievement(
    Path(achievement_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateAchievementRequest>,
) -> Result<Json<ApiResponse<AchievementResponse>>, (StatusCode, Json<ValidationErrorResponse>)> {
    trace!(
        "Entering update_achievement function for achievement_id: {}",
        achievement_id
    );

    // Find the existing achievement first
    let existing = match achievement::Entity::find_by_id(achievement_id)
        .one(&state.db)
        .await
    {
        Ok(Some(existing)) => existing,
        Ok(None) => {
            warn!(
                "Achievement with ID {} not found for update",
                achievement_id
            );
            return Err((
                StatusCode::NOT_FOUND,
                Json(ValidationErrorResponse {
                    errors: vec![format!("achievement {} not found", achievement_id)],
                    code: "NOT_FOUND".to_string(),
                    success: false,
                }),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to look up achievement {} for update: {}",
                achievement_id, db_error
            );
            return Err(database_error());
        }
    };

    let new_title = request.title.clone().unwrap_or_else(|| existing.title.clone());
    let draft = AchievementDraft {
        title: new_title.clone(),
        user_id: Some(existing.user_id),
    };
    let errors = match validate_achievement(&state.db, &draft, Some(existing.id)).await {
        Ok(errors) => errors,
        Err(db_error) => {
            error!("Validation query failed: {}", db_error);
            return Err(database_error());
        }
    };
    if !errors.is_empty() {
        warn!(
            "Achievement {} failed update validation: {:?}",
            achievement_id, errors
        );
        return Err(validation_failed(&errors));
    }

    let owner = match user::Entity::find_by_id(existing.user_id).one(&state.db).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            error!(
                "Achievement {} has no owner row; data is inconsistent",
                achievement_id
            );
            return Err(database_error());
        }
        Err(db_error) => {
            error!("Failed to look up owner: {}", db_error);
            return Err(database_error());
        }
    };

    // Apply only the provided fields
    let mut achievement_active: achievement::ActiveModel = existing.into();
    achievement_active.title = Set(new_title);
    if let Some(description) = request.description {
        achievement_active.description = Set(Some(description));
    }
    if let Some(is_public) = request.is_public {
        achievement_active.is_public = Set(is_public);
    }
    if let Some(is_featured) = request.is_featured {
        achievement_active.is_featured = Set(is_featured);
    }
    if let Some(cover_image) = request.cover_image {
        achievement_active.cover_image = Set(Some(cover_image));
    }

    match achievement_active.update(&state.db).await {
        Ok(updated) => {
            info!("Achievement with ID {} updated successfully", achievement_id);
            let response = ApiResponse {
                data: AchievementResponse::from_model(updated, &owner),
                message: "Achievement has been updated".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to update achievement with ID {}: {}",
                achievement_id, db_error
            );
            Err(database_error())
        }
    }
}

/// Delete an achievement
#[utoipa::path(
    delete,
    path = "/api/v1/achievements/{achievement_id}",
    tag = "achievements",
    params(
        ("achievement_id" = i32, Path, description = "Achievement ID"),
    ),
    responses(
        (status = 200, description = "Achievement deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Achievement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_achievement(
    Path(achievement_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!(
        "Entering delete_achievement function for achievement_id: {}",
        achievement_id
    );

    match achievement::Entity::delete_by_id(achievement_id)
        .exec(&state.db)
        .await
    {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Achievement with ID {} deleted successfully", achievement_id);
                let response = ApiResponse {
                    data: format!("Achievement {} deleted", achievement_id),
                    message: "Achievement has been deleted".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!(
                    "Achievement with ID {} not found for deletion",
                    achievement_id
                );
                Err(StatusCode::NOT_FOUND)
            }
        }
        Err(db_error) => {
            error!(
                "Failed to delete achievement with ID {}: {}",
                achievement_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
