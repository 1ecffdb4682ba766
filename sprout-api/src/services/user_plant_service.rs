use diesel::prelude::*;

use sprout_shared::clients::db::DbPool;
use sprout_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewUserPlant, Plant, UserPlant};
use crate::schema::{plants, user_plants};

/// All plants a user tracks, with the plant rows joined in.
pub fn list_user_plants(pool: &DbPool, user_id: i32) -> AppResult<Vec<(UserPlant, Plant)>> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows = user_plants::table
        .inner_join(plants::table)
        .filter(user_plants::user_id.eq(user_id))
        .order(user_plants::created_at.desc())
        .select((user_plants::all_columns, plants::all_columns))
        .load::<(UserPlant, Plant)>(&mut conn)?;

    Ok(rows)
}

/// Start tracking a plant. Tracking is what makes the user a recipient of
/// that plant's regular watering reminders.
pub fn add_user_plant(
    pool: &DbPool,
    user_id: i32,
    plant_id: i32,
    customize_name: Option<String>,
) -> AppResult<UserPlant> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let plant_exists: i64 = plants::table
        .filter(plants::id.eq(plant_id))
        .count()
        .get_result(&mut conn)?;
    if plant_exists == 0 {
        return Err(AppError::new(ErrorCode::PlantNotFound, "plant not found"));
    }

    let already: i64 = user_plants::table
        .filter(user_plants::user_id.eq(user_id))
        .filter(user_plants::plant_id.eq(plant_id))
        .count()
        .get_result(&mut conn)?;
    if already > 0 {
        return Err(AppError::new(ErrorCode::AlreadyTracking, "plant is already in your garden"));
    }

    let row = diesel::insert_into(user_plants::table)
        .values(&NewUserPlant { user_id, plant_id, customize_name })
        .get_result::<UserPlant>(&mut conn)?;

    tracing::info!(user_id = user_id, plant_id = plant_id, "user started tracking plant");
    Ok(row)
}

/// Stop tracking. Owner-checked: deleting someone else's row is a not-found.
pub fn remove_user_plant(pool: &DbPool, user_plant_id: i32, user_id: i32) -> AppResult<()> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = diesel::delete(
        user_plants::table
            .filter(user_plants::id.eq(user_plant_id))
            .filter(user_plants::user_id.eq(user_id)),
    )
    .execute(&mut conn)?;

    if removed == 0 {
        return Err(AppError::new(ErrorCode::UserPlantNotFound, "tracked plant not found"));
    }

    Ok(())
}

/// Rename a tracked plant (the user-facing nickname only).
pub fn rename_user_plant(
    pool: &DbPool,
    user_plant_id: i32,
    user_id: i32,
    customize_name: String,
) -> AppResult<UserPlant> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    diesel::update(
        user_plants::table
            .filter(user_plants::id.eq(user_plant_id))
            .filter(user_plants::user_id.eq(user_id)),
    )
    .set(user_plants::customize_name.eq(Some(customize_name)))
    .get_result::<UserPlant>(&mut conn)
    .map_err(|e| match e {
        diesel::result::Error::NotFound => {
            AppError::new(ErrorCode::UserPlantNotFound, "tracked plant not found")
        }
        other => AppError::Database(other),
    })
}
