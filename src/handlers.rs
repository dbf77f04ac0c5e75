pub mod achievements;
pub mod health;
pub mod users;
