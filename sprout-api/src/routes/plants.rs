use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use sprout_shared::errors::{AppError, AppResult, ErrorCode};
use sprout_shared::middleware::AdminUser;
use sprout_shared::types::api::ApiResponse;
use sprout_shared::types::pagination::{Paginated, PaginationParams};
use sprout_shared::types::schedule::{Cadence, WallTime};

use crate::models::{NewPlant, NewPlantCategory, Plant, PlantCategory, PlantChanges, PlantReminder};
use crate::services::plant_service::{self, NewSchedule, ScheduleChanges};
use crate::AppState;

/// A plant with its watering schedule inlined, the shape the mobile app
/// renders on the catalog screens.
#[derive(Debug, Serialize)]
pub struct PlantDetail {
    #[serde(flatten)]
    pub plant: Plant,
    pub watering_schedule: Option<PlantReminder>,
}

impl From<(Plant, Option<PlantReminder>)> for PlantDetail {
    fn from((plant, watering_schedule): (Plant, Option<PlantReminder>)) -> Self {
        Self { plant, watering_schedule }
    }
}

/// GET /plants
pub async fn list_plants(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<PlantDetail>>>> {
    let (items, total) =
        plant_service::list_plants(&state.db, params.limit() as i64, params.offset() as i64)?;

    let items: Vec<PlantDetail> = items.into_iter().map(PlantDetail::from).collect();
    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

/// GET /plants/:id
pub async fn get_plant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<PlantDetail>>> {
    let detail = plant_service::get_plant(&state.db, id)?;
    Ok(Json(ApiResponse::ok(detail.into())))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub watering_frequency: i32,
    pub each: Cadence,
    pub watering_amount: i32,
    pub unit: String,
    pub watering_time: Vec<WallTime>,
    #[serde(default)]
    pub weather_condition: String,
    #[serde(default)]
    pub condition_description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlantRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub is_toxic: bool,
    pub harvest_duration: i32,
    pub sunlight: String,
    pub planting_time: String,
    pub plant_category_id: i32,
    pub climate_condition: String,
    #[serde(default)]
    pub additional_tips: String,
    pub watering_schedule: ScheduleRequest,
}

/// POST /plants (admin)
pub async fn create_plant(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<CreatePlantRequest>,
) -> AppResult<Json<ApiResponse<PlantDetail>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    if req.watering_schedule.watering_time.is_empty() {
        return Err(AppError::new(
            ErrorCode::InvalidWateringTime,
            "watering_time must contain at least one HH:MM entry",
        ));
    }

    let new_plant = NewPlant {
        name: req.name,
        description: req.description,
        is_toxic: req.is_toxic,
        harvest_duration: req.harvest_duration,
        sunlight: req.sunlight,
        planting_time: req.planting_time,
        plant_category_id: req.plant_category_id,
        climate_condition: req.climate_condition,
        additional_tips: req.additional_tips,
    };
    let schedule = NewSchedule {
        watering_frequency: req.watering_schedule.watering_frequency,
        each: req.watering_schedule.each,
        watering_amount: req.watering_schedule.watering_amount,
        unit: req.watering_schedule.unit,
        watering_times: req.watering_schedule.watering_time,
        weather_condition: req.watering_schedule.weather_condition,
        condition_description: req.watering_schedule.condition_description,
    };

    let (plant, reminder) = plant_service::create_plant(&state.db, new_plant, schedule)?;
    Ok(Json(ApiResponse::ok_with_message(
        PlantDetail { plant, watering_schedule: Some(reminder) },
        "plant created",
    )))
}

#[derive(Debug, Deserialize, Default)]
pub struct ScheduleChangesRequest {
    pub watering_frequency: Option<i32>,
    pub each: Option<Cadence>,
    pub watering_amount: Option<i32>,
    pub unit: Option<String>,
    pub watering_time: Option<Vec<WallTime>>,
    pub weather_condition: Option<String>,
    pub condition_description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlantRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_toxic: Option<bool>,
    pub harvest_duration: Option<i32>,
    pub sunlight: Option<String>,
    pub planting_time: Option<String>,
    pub plant_category_id: Option<i32>,
    pub climate_condition: Option<String>,
    pub additional_tips: Option<String>,
    pub watering_schedule: Option<ScheduleChangesRequest>,
}

/// PUT /plants/:id (admin)
pub async fn update_plant(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(req): Json<UpdatePlantRequest>,
) -> AppResult<Json<ApiResponse<PlantDetail>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    if let Some(schedule) = &req.watering_schedule {
        if schedule.watering_time.as_ref().is_some_and(|t| t.is_empty()) {
            return Err(AppError::new(
                ErrorCode::InvalidWateringTime,
                "watering_time must contain at least one HH:MM entry",
            ));
        }
    }

    let changes = PlantChanges {
        name: req.name,
        description: req.description,
        is_toxic: req.is_toxic,
        harvest_duration: req.harvest_duration,
        sunlight: req.sunlight,
        planting_time: req.planting_time,
        plant_category_id: req.plant_category_id,
        climate_condition: req.climate_condition,
        additional_tips: req.additional_tips,
    };
    let schedule = req
        .watering_schedule
        .map(|s| ScheduleChanges {
            watering_frequency: s.watering_frequency,
            each: s.each,
            watering_amount: s.watering_amount,
            unit: s.unit,
            watering_times: s.watering_time,
            weather_condition: s.weather_condition,
            condition_description: s.condition_description,
        })
        .unwrap_or_default();

    let detail = plant_service::update_plant(&state.db, id, changes, schedule)?;
    Ok(Json(ApiResponse::ok(detail.into())))
}

/// DELETE /plants/:id (admin)
pub async fn delete_plant(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    plant_service::delete_plant(&state.db, id)?;
    Ok(Json(ApiResponse::ok_with_message(serde_json::json!({}), "plant deleted")))
}

/// GET /plant-categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<PlantCategory>>>> {
    let categories = plant_service::list_categories(&state.db)?;
    Ok(Json(ApiResponse::ok(categories)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    pub image_url: Option<String>,
}

/// POST /plant-categories (admin)
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<PlantCategory>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let category = plant_service::create_category(
        &state.db,
        NewPlantCategory { name: req.name, image_url: req.image_url },
    )?;
    Ok(Json(ApiResponse::ok_with_message(category, "category created")))
}
