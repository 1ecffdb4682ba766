pub mod auth_service;
pub mod notification_service;
pub mod plant_service;
pub mod reminder_service;
pub mod token_service;
pub mod user_plant_service;
