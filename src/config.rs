use std::sync::Arc;

use anyhow::Result;
use sea_orm::Database;

use crate::mailer::{LogMailer, Mailer, SmtpMailer};
use crate::schemas::AppState;

/// Initialize application configuration and state
pub async fn initialize_app_state() -> Result<AppState> {
    // Load configuration
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://kudos.db".to_string());

    initialize_app_state_with_url(&database_url).await
}

/// Initialize application state against a specific database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    // Connect to database
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    // Public base URL used to build achievement links in notification mails
    let base_url =
        std::env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    // SMTP is optional; without it, notification handoffs are only logged.
    let mailer: Arc<dyn Mailer> = match std::env::var("SMTP_URL") {
        Ok(smtp_url) => {
            let from = std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "kudos <no-reply@localhost>".to_string());
            tracing::info!("Using SMTP transport for notification mail");
            Arc::new(SmtpMailer::new(&smtp_url, &from)?)
        }
        Err(_) => {
            tracing::info!("SMTP_URL not set, notification mail will be logged only");
            Arc::new(LogMailer)
        }
    };

    Ok(AppState {
        db,
        mailer,
        base_url,
    })
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
