use diesel::prelude::*;

use sprout_shared::clients::db::DbPool;
use sprout_shared::errors::{AppError, AppResult, ErrorCode};
use sprout_shared::types::schedule::{Cadence, WallTime};

use crate::models::{
    NewPlant, NewPlantCategory, NewPlantReminder, Plant, PlantCategory, PlantChanges,
    PlantReminder, PlantReminderChanges,
};
use crate::schema::{customize_watering_reminders, plant_categories, plant_reminders, plants, user_plants};

/// Typed input for a plant's watering schedule. Holding parsed `WallTime`s
/// and a `Cadence` here means a row can only ever be written with
/// well-formed values; the stored column is the joined "HH:MM, HH:MM" list.
#[derive(Debug)]
pub struct NewSchedule {
    pub watering_frequency: i32,
    pub each: Cadence,
    pub watering_amount: i32,
    pub unit: String,
    pub watering_times: Vec<WallTime>,
    pub weather_condition: String,
    pub condition_description: String,
}

fn join_times(times: &[WallTime]) -> String {
    times
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl NewSchedule {
    fn into_row(self, plant_id: i32) -> NewPlantReminder {
        NewPlantReminder {
            plant_id,
            watering_frequency: self.watering_frequency,
            each: self.each.as_str().to_string(),
            watering_amount: self.watering_amount,
            unit: self.unit,
            watering_time: join_times(&self.watering_times),
            weather_condition: self.weather_condition,
            condition_description: self.condition_description,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScheduleChanges {
    pub watering_frequency: Option<i32>,
    pub each: Option<Cadence>,
    pub watering_amount: Option<i32>,
    pub unit: Option<String>,
    pub watering_times: Option<Vec<WallTime>>,
    pub weather_condition: Option<String>,
    pub condition_description: Option<String>,
}

impl ScheduleChanges {
    fn is_empty(&self) -> bool {
        self.watering_frequency.is_none()
            && self.each.is_none()
            && self.watering_amount.is_none()
            && self.unit.is_none()
            && self.watering_times.is_none()
            && self.weather_condition.is_none()
            && self.condition_description.is_none()
    }

    fn into_row(self) -> PlantReminderChanges {
        PlantReminderChanges {
            watering_frequency: self.watering_frequency,
            each: self.each.map(|c| c.as_str().to_string()),
            watering_amount: self.watering_amount,
            unit: self.unit,
            watering_time: self.watering_times.as_deref().map(join_times),
            weather_condition: self.weather_condition,
            condition_description: self.condition_description,
        }
    }
}

pub fn list_plants(
    pool: &DbPool,
    limit: i64,
    offset: i64,
) -> AppResult<(Vec<(Plant, Option<PlantReminder>)>, i64)> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total: i64 = plants::table.count().get_result(&mut conn)?;

    let items = plants::table
        .left_join(plant_reminders::table)
        .order(plants::name.asc())
        .limit(limit)
        .offset(offset)
        .select((plants::all_columns, plant_reminders::all_columns.nullable()))
        .load::<(Plant, Option<PlantReminder>)>(&mut conn)?;

    Ok((items, total))
}

pub fn get_plant(pool: &DbPool, plant_id: i32) -> AppResult<(Plant, Option<PlantReminder>)> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    plants::table
        .left_join(plant_reminders::table)
        .filter(plants::id.eq(plant_id))
        .select((plants::all_columns, plant_reminders::all_columns.nullable()))
        .first::<(Plant, Option<PlantReminder>)>(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                AppError::new(ErrorCode::PlantNotFound, "plant not found")
            }
            other => AppError::Database(other),
        })
}

/// Creates a plant together with its watering schedule, as one unit.
pub fn create_plant(
    pool: &DbPool,
    new_plant: NewPlant,
    schedule: NewSchedule,
) -> AppResult<(Plant, PlantReminder)> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let name_taken: i64 = plants::table
        .filter(plants::name.eq(&new_plant.name))
        .count()
        .get_result(&mut conn)?;
    if name_taken > 0 {
        return Err(AppError::new(ErrorCode::PlantNameTaken, "a plant with this name already exists"));
    }

    let category_exists: i64 = plant_categories::table
        .filter(plant_categories::id.eq(new_plant.plant_category_id))
        .count()
        .get_result(&mut conn)?;
    if category_exists == 0 {
        return Err(AppError::new(ErrorCode::PlantCategoryNotFound, "plant category not found"));
    }

    let (plant, reminder) = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let plant = diesel::insert_into(plants::table)
            .values(&new_plant)
            .get_result::<Plant>(conn)?;

        let reminder = diesel::insert_into(plant_reminders::table)
            .values(&schedule.into_row(plant.id))
            .get_result::<PlantReminder>(conn)?;

        Ok((plant, reminder))
    })?;

    tracing::info!(plant_id = plant.id, name = %plant.name, "plant created");
    Ok((plant, reminder))
}

pub fn update_plant(
    pool: &DbPool,
    plant_id: i32,
    changes: PlantChanges,
    schedule: ScheduleChanges,
) -> AppResult<(Plant, Option<PlantReminder>)> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let has_plant_changes = changes.name.is_some()
        || changes.description.is_some()
        || changes.is_toxic.is_some()
        || changes.harvest_duration.is_some()
        || changes.sunlight.is_some()
        || changes.planting_time.is_some()
        || changes.plant_category_id.is_some()
        || changes.climate_condition.is_some()
        || changes.additional_tips.is_some();

    if has_plant_changes {
        let updated = diesel::update(plants::table.find(plant_id))
            .set(&changes)
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(AppError::new(ErrorCode::PlantNotFound, "plant not found"));
        }
    }

    if !schedule.is_empty() {
        diesel::update(plant_reminders::table.filter(plant_reminders::plant_id.eq(plant_id)))
            .set(&schedule.into_row())
            .execute(&mut conn)?;
    }

    get_plant(pool, plant_id)
}

/// Removes a plant and everything hanging off it: its watering schedule,
/// tracking rows, and customized reminders (notification rows are soft
/// references and stay).
pub fn delete_plant(pool: &DbPool, plant_id: i32) -> AppResult<()> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(plant_reminders::table.filter(plant_reminders::plant_id.eq(plant_id)))
            .execute(conn)?;
        diesel::delete(user_plants::table.filter(user_plants::plant_id.eq(plant_id)))
            .execute(conn)?;
        diesel::delete(
            customize_watering_reminders::table
                .filter(customize_watering_reminders::plant_id.eq(plant_id)),
        )
        .execute(conn)?;
        diesel::delete(plants::table.find(plant_id)).execute(conn)
    })?;

    if removed == 0 {
        return Err(AppError::new(ErrorCode::PlantNotFound, "plant not found"));
    }

    tracing::info!(plant_id = plant_id, "plant deleted");
    Ok(())
}

pub fn list_categories(pool: &DbPool) -> AppResult<Vec<PlantCategory>> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let categories = plant_categories::table
        .order(plant_categories::name.asc())
        .load::<PlantCategory>(&mut conn)?;

    Ok(categories)
}

pub fn create_category(pool: &DbPool, new_category: NewPlantCategory) -> AppResult<PlantCategory> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let category = diesel::insert_into(plant_categories::table)
        .values(&new_category)
        .get_result::<PlantCategory>(&mut conn)?;

    Ok(category)
}
