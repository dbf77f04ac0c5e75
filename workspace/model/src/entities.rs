//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the achievements application here:
//! the authoring user and the achievement record itself.

pub mod achievement;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::achievement::Entity as Achievement;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
        ModelTrait, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Apply migrations
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn create_user(db: &DatabaseConnection, email: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            email: Set(email.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    async fn create_achievement(
        db: &DatabaseConnection,
        title: &str,
        owner: &user::Model,
    ) -> Result<achievement::Model, DbErr> {
        achievement::ActiveModel {
            title: Set(title.to_string()),
            is_public: Set(true),
            user_id: Set(owner.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        // Setup database
        let db = setup_db().await?;

        // Create users
        let user1 = create_user(&db, "author@example.com").await?;
        let user2 = create_user(&db, "other@example.com").await?;

        // Create achievements
        let achievement1 = achievement::ActiveModel {
            title: Set("Worked out today".to_string()),
            description: Set(Some("Crushed abs and cardio".to_string())),
            is_public: Set(true),
            is_featured: Set(true),
            cover_image: Set(Some("covers/workout.png".to_string())),
            user_id: Set(user1.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let achievement2 = create_achievement(&db, "Read a book", &user2).await?;

        // Read back and verify data
        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.email == "author@example.com"));
        assert!(users.iter().any(|u| u.email == "other@example.com"));

        let achievements = Achievement::find().all(&db).await?;
        assert_eq!(achievements.len(), 2);
        assert!(achievements.iter().any(|a| a.title == "Worked out today"));
        assert!(achievements.iter().any(|a| a.title == "Read a book"));

        // Traverse the relation in both directions
        let owner = achievement1
            .find_related(User)
            .one(&db)
            .await?
            .expect("achievement must have an owner");
        assert_eq!(owner.id, user1.id);

        let authored = user2.find_related(Achievement).all(&db).await?;
        assert_eq!(authored.len(), 1);
        assert_eq!(authored[0].id, achievement2.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_by_letter_filters_titles() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let user = create_user(&db, "author@example.com").await?;

        let read_a_book = create_achievement(&db, "Read a book", &user).await?;
        create_achievement(&db, "Passed an exam", &user).await?;

        let found = achievement::by_letter(&db, 'R').await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, read_a_book.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_by_letter_matches_case_insensitively() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let user = create_user(&db, "author@example.com").await?;

        create_achievement(&db, "Read a book", &user).await?;
        create_achievement(&db, "rode a bike", &user).await?;

        let found = achievement::by_letter(&db, 'r').await?;
        assert_eq!(found.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_by_letter_sorts_by_owner_email() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let dutch = create_user(&db, "dutch@example.com").await?;
        let maverick = create_user(&db, "maverick@example.com").await?;

        // Insertion order is the reverse of the expected result order.
        let bite = create_achievement(&db, "Didn't bite anyone", &maverick).await?;
        let bark = create_achievement(&db, "Didn't bark", &dutch).await?;

        let found = achievement::by_letter(&db, 'D').await?;
        let ids: Vec<i32> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![bark.id, bite.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_by_letter_returns_empty_for_no_match() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let user = create_user(&db, "author@example.com").await?;
        create_achievement(&db, "Read a book", &user).await?;

        let found = achievement::by_letter(&db, 'Z').await?;
        assert!(found.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_by_letter_includes_private_achievements() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let user = create_user(&db, "author@example.com").await?;

        achievement::ActiveModel {
            title: Set("Read a book".to_string()),
            is_public: Set(false),
            user_id: Set(user.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let found = achievement::by_letter(&db, 'R').await?;
        assert_eq!(found.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_title_per_owner_is_rejected_by_the_store() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let user = create_user(&db, "author@example.com").await?;
        create_achievement(&db, "Read a book", &user).await?;

        // The unique index catches what racing validations might miss.
        let result = create_achievement(&db, "Read a book", &user).await;
        assert!(result.is_err());

        // The same title under another owner is fine.
        let other = create_user(&db, "other@example.com").await?;
        create_achievement(&db, "Read a book", &other).await?;

        Ok(())
    }
}
