//! Pre-persistence validation for achievements.
//!
//! The duplicate check runs against the live store so it observes every
//! previously committed achievement for the same owner. Failures are
//! collected rather than short-circuited so the caller can display every
//! problem at once. An empty result means the draft is valid.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use thiserror::Error;
use tracing::instrument;

use crate::entities::{achievement, user};

/// A single validation failure, displayable as its user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title can't be blank")]
    BlankTitle,
    #[error("you can't have two achievements with same title")]
    DuplicateTitle,
    #[error("achievement must have an owner")]
    MissingOwner,
}

/// The candidate fields checked before an insert or update.
#[derive(Debug, Clone, Default)]
pub struct AchievementDraft {
    pub title: String,
    pub user_id: Option<i32>,
}

/// Validate a draft achievement against the store.
///
/// Title uniqueness is a byte-exact comparison scoped to the owner, so
/// "Read a book" and "read a book" are two different achievements. On
/// update, `exclude_id` carries the record's own id so it does not collide
/// with itself.
#[instrument(skip(db))]
pub async fn validate_achievement<C: ConnectionTrait>(
    db: &C,
    draft: &AchievementDraft,
    exclude_id: Option<i32>,
) -> Result<Vec<ValidationError>, DbErr> {
    let mut errors = Vec::new();

    let blank_title = draft.title.trim().is_empty();
    if blank_title {
        errors.push(ValidationError::BlankTitle);
    }

    let owner = match draft.user_id {
        Some(id) => user::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    if owner.is_none() {
        errors.push(ValidationError::MissingOwner);
    }

    // The duplicate check only applies once there is a title to compare
    // and an owner to scope it to.
    if !blank_title {
        if let Some(owner) = &owner {
            let mut query = achievement::Entity::find()
                .filter(achievement::Column::UserId.eq(owner.id))
                .filter(achievement::Column::Title.eq(draft.title.as_str()));
            if let Some(id) = exclude_id {
                query = query.filter(achievement::Column::Id.ne(id));
            }
            if query.one(db).await?.is_some() {
                errors.push(ValidationError::DuplicateTitle);
            }
        }
    }

    Ok(errors)
}
