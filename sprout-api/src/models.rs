use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{
    customize_watering_reminders, notifications, plant_categories, plant_reminders, plants,
    user_plants, users,
};

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub fcm_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = plant_categories)]
pub struct PlantCategory {
    pub id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = plant_categories)]
pub struct NewPlantCategory {
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = plants)]
pub struct Plant {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub is_toxic: bool,
    pub harvest_duration: i32,
    pub sunlight: String,
    pub planting_time: String,
    pub plant_category_id: i32,
    pub climate_condition: String,
    pub additional_tips: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = plants)]
pub struct NewPlant {
    pub name: String,
    pub description: String,
    pub is_toxic: bool,
    pub harvest_duration: i32,
    pub sunlight: String,
    pub planting_time: String,
    pub plant_category_id: i32,
    pub climate_condition: String,
    pub additional_tips: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = plants)]
pub struct PlantChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_toxic: Option<bool>,
    pub harvest_duration: Option<i32>,
    pub sunlight: Option<String>,
    pub planting_time: Option<String>,
    pub plant_category_id: Option<i32>,
    pub climate_condition: Option<String>,
    pub additional_tips: Option<String>,
}

/// The per-plant watering schedule. `watering_time` holds a `", "`-separated
/// list of "HH:MM" entries; `each` holds the cadence tag ("Day"/"Week"/"Month").
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = plant_reminders, belongs_to(Plant))]
pub struct PlantReminder {
    pub id: i32,
    pub plant_id: i32,
    pub watering_frequency: i32,
    pub each: String,
    pub watering_amount: i32,
    pub unit: String,
    pub watering_time: String,
    pub weather_condition: String,
    pub condition_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = plant_reminders)]
pub struct NewPlantReminder {
    pub plant_id: i32,
    pub watering_frequency: i32,
    pub each: String,
    pub watering_amount: i32,
    pub unit: String,
    pub watering_time: String,
    pub weather_condition: String,
    pub condition_description: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = plant_reminders)]
pub struct PlantReminderChanges {
    pub watering_frequency: Option<i32>,
    pub each: Option<String>,
    pub watering_amount: Option<i32>,
    pub unit: Option<String>,
    pub watering_time: Option<String>,
    pub weather_condition: Option<String>,
    pub condition_description: Option<String>,
}

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = user_plants)]
pub struct UserPlant {
    pub id: i32,
    pub user_id: i32,
    pub plant_id: i32,
    pub customize_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_plants)]
pub struct NewUserPlant {
    pub user_id: i32,
    pub plant_id: i32,
    pub customize_name: Option<String>,
}

/// A per-user, per-plant reminder with its own time and recurrence flag.
/// Non-recurring rows are deleted by the scheduler after one dispatch.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = customize_watering_reminders)]
pub struct CustomizeWateringReminder {
    pub id: i32,
    pub user_id: i32,
    pub plant_id: i32,
    pub time: String,
    pub recurring: bool,
    #[serde(rename = "type")]
    pub reminder_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customize_watering_reminders)]
pub struct NewCustomizeWateringReminder {
    pub user_id: i32,
    pub plant_id: i32,
    pub time: String,
    pub recurring: bool,
    pub reminder_type: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub user_id: i32,
    pub plant_id: i32,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub title: String,
    pub body: String,
    pub user_id: i32,
    pub plant_id: i32,
    pub is_read: bool,
}
