pub mod auth;
pub mod health;
pub mod notifications;
pub mod plants;
pub mod reminders;
pub mod user_plants;
