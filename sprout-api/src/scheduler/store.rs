use diesel::prelude::*;

use sprout_shared::clients::db::DbPool;
use sprout_shared::types::schedule::{Cadence, WallTime};

use crate::models::{CustomizeWateringReminder, NewNotification, Plant, PlantReminder, User};
use crate::schema::{customize_watering_reminders, notifications, plant_reminders, plants, user_plants, users};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database connection error: {0}")]
    Pool(String),

    #[error(transparent)]
    Query(#[from] diesel::result::Error),
}

/// A customized reminder with its bound user and plant eager-loaded,
/// so dispatch never goes back to the database per row.
#[derive(Debug, Clone)]
pub struct DueCustomReminder {
    pub reminder: CustomizeWateringReminder,
    pub user: User,
    pub plant: Plant,
}

/// Database reads and writes performed by a scheduler tick.
///
/// The scheduler only sees this trait; tests drive it with an in-memory
/// implementation.
pub trait ReminderStore: Send + Sync {
    /// Plants whose regular watering schedule carries the given cadence tag.
    /// This is the coarse filter; exact-time matching against the parsed
    /// `watering_time` list happens in the caller.
    fn plants_with_cadence(&self, cadence: Cadence) -> Result<Vec<(Plant, PlantReminder)>, StoreError>;

    /// Users currently tracking the plant, via the `user_plants` join.
    fn trackers(&self, plant_id: i32) -> Result<Vec<User>, StoreError>;

    /// Customized reminders matching both cadence tag and exact time.
    fn due_customized(&self, cadence: Cadence, at: WallTime) -> Result<Vec<DueCustomReminder>, StoreError>;

    fn insert_notification(&self, notification: NewNotification) -> Result<(), StoreError>;

    /// Removes a consumed one-shot reminder.
    fn delete_customized(&self, reminder_id: i32) -> Result<(), StoreError>;
}

/// Diesel-backed store used by the live scheduler.
pub struct PgReminderStore {
    pool: DbPool,
}

impl PgReminderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::PgConnection>>, StoreError> {
        self.pool.get().map_err(|e| StoreError::Pool(e.to_string()))
    }
}

impl ReminderStore for PgReminderStore {
    fn plants_with_cadence(&self, cadence: Cadence) -> Result<Vec<(Plant, PlantReminder)>, StoreError> {
        let mut conn = self.conn()?;

        let rows = plants::table
            .inner_join(plant_reminders::table)
            .filter(plant_reminders::each.eq(cadence.as_str()))
            .select((plants::all_columns, plant_reminders::all_columns))
            .load::<(Plant, PlantReminder)>(&mut conn)?;

        Ok(rows)
    }

    fn trackers(&self, plant_id: i32) -> Result<Vec<User>, StoreError> {
        let mut conn = self.conn()?;

        let rows = users::table
            .inner_join(user_plants::table)
            .filter(user_plants::plant_id.eq(plant_id))
            .select(users::all_columns)
            .load::<User>(&mut conn)?;

        Ok(rows)
    }

    fn due_customized(&self, cadence: Cadence, at: WallTime) -> Result<Vec<DueCustomReminder>, StoreError> {
        let mut conn = self.conn()?;

        let rows = customize_watering_reminders::table
            .inner_join(users::table)
            .inner_join(plants::table)
            .filter(customize_watering_reminders::reminder_type.eq(cadence.as_str()))
            .filter(customize_watering_reminders::time.eq(at.to_string()))
            .select((
                customize_watering_reminders::all_columns,
                users::all_columns,
                plants::all_columns,
            ))
            .load::<(CustomizeWateringReminder, User, Plant)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(reminder, user, plant)| DueCustomReminder { reminder, user, plant })
            .collect())
    }

    fn insert_notification(&self, notification: NewNotification) -> Result<(), StoreError> {
        let mut conn = self.conn()?;

        diesel::insert_into(notifications::table)
            .values(&notification)
            .execute(&mut conn)?;

        Ok(())
    }

    fn delete_customized(&self, reminder_id: i32) -> Result<(), StoreError> {
        let mut conn = self.conn()?;

        diesel::delete(customize_watering_reminders::table.find(reminder_id)).execute(&mut conn)?;

        Ok(())
    }
}
