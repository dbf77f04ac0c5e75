use super::user;
use pulldown_cmark::{html, Parser};
use sea_orm::entity::prelude::*;
use sea_orm::{Condition, ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect};

/// Represents a single posted achievement.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "achievements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique per author; enforced by validation and a unique index.
    pub title: String,
    /// Markdown source text. Rendered to HTML on demand, never stored.
    pub description: Option<String>,
    /// If false, the achievement is only meant for its author's eyes.
    /// Queries in this module do not filter on it; visibility is the
    /// calling layer's decision.
    #[sea_orm(default_value = "false")]
    pub is_public: bool,
    /// Cosmetic flag, no rule depends on it.
    #[sea_orm(default_value = "false")]
    pub is_featured: bool,
    /// Reference to an externally stored cover image.
    pub cover_image: Option<String>,
    /// The user who authored this achievement.
    pub user_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// An achievement belongs to one author.
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Render the markdown description to HTML.
    ///
    /// Recomputed on every call so the HTML can never go stale against the
    /// stored source. A missing description renders as an empty string, and
    /// plain text passes through unharmed.
    pub fn description_html(&self) -> String {
        let source = self.description.as_deref().unwrap_or("");
        let mut out = String::with_capacity(source.len());
        html::push_html(&mut out, Parser::new(source));
        out
    }

    /// The tongue-in-cheek display title: `"<title> by <owner email>"`.
    pub fn silly_achievement(&self, owner: &user::Model) -> String {
        format!("{} by {}", self.title, owner.email)
    }
}

/// Find achievements whose title starts with the given letter and order
/// them ascending by the author's email address.
///
/// The letter matches case-insensitively. Checking both cased variants with
/// LIKE keeps the behavior identical across SQLite and Postgres collations.
/// Non-public achievements are included; callers decide about visibility.
pub async fn by_letter<C: ConnectionTrait>(db: &C, letter: char) -> Result<Vec<Model>, DbErr> {
    let lower: String = letter.to_lowercase().collect();
    let upper: String = letter.to_uppercase().collect();

    Entity::find()
        .filter(
            Condition::any()
                .add(Column::Title.starts_with(lower.as_str()))
                .add(Column::Title.starts_with(upper.as_str())),
        )
        .join(JoinType::InnerJoin, Relation::User.def())
        .order_by_asc(user::Column::Email)
        .all(db)
        .await
}
