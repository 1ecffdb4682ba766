use diesel::prelude::*;

use sprout_shared::clients::db::DbPool;
use sprout_shared::errors::{AppError, AppResult, ErrorCode};
use sprout_shared::types::schedule::{Cadence, WallTime};

use crate::models::{CustomizeWateringReminder, NewCustomizeWateringReminder};
use crate::schema::{customize_watering_reminders, plants};

/// Create a per-user watering reminder. The time and cadence arrive already
/// parsed, so the stored row always satisfies the scheduler's matching
/// format. A non-recurring reminder will be consumed by its first dispatch.
pub fn create_customized(
    pool: &DbPool,
    user_id: i32,
    plant_id: i32,
    time: WallTime,
    cadence: Cadence,
    recurring: bool,
) -> AppResult<CustomizeWateringReminder> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let plant_exists: i64 = plants::table
        .filter(plants::id.eq(plant_id))
        .count()
        .get_result(&mut conn)?;
    if plant_exists == 0 {
        return Err(AppError::new(ErrorCode::PlantNotFound, "plant not found"));
    }

    let reminder = diesel::insert_into(customize_watering_reminders::table)
        .values(&NewCustomizeWateringReminder {
            user_id,
            plant_id,
            time: time.to_string(),
            recurring,
            reminder_type: cadence.as_str().to_string(),
        })
        .get_result::<CustomizeWateringReminder>(&mut conn)?;

    tracing::info!(
        reminder_id = reminder.id,
        user_id = user_id,
        plant_id = plant_id,
        cadence = %cadence,
        time = %time,
        recurring = recurring,
        "customized watering reminder created"
    );
    Ok(reminder)
}

pub fn list_customized(pool: &DbPool, user_id: i32) -> AppResult<Vec<CustomizeWateringReminder>> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let reminders = customize_watering_reminders::table
        .filter(customize_watering_reminders::user_id.eq(user_id))
        .order(customize_watering_reminders::created_at.desc())
        .load::<CustomizeWateringReminder>(&mut conn)?;

    Ok(reminders)
}

/// Owner-checked delete for a reminder the user no longer wants.
pub fn delete_customized(pool: &DbPool, reminder_id: i32, user_id: i32) -> AppResult<()> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = diesel::delete(
        customize_watering_reminders::table
            .filter(customize_watering_reminders::id.eq(reminder_id))
            .filter(customize_watering_reminders::user_id.eq(user_id)),
    )
    .execute(&mut conn)?;

    if removed == 0 {
        return Err(AppError::new(ErrorCode::ReminderNotFound, "reminder not found"));
    }

    Ok(())
}
