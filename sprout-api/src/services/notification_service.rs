use diesel::prelude::*;

use sprout_shared::clients::db::DbPool;
use sprout_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::Notification;
use crate::schema::notifications;

/// List a user's notifications, newest first, with pagination.
pub fn list_notifications(
    pool: &DbPool,
    user_id: i32,
    limit: i64,
    offset: i64,
) -> AppResult<(Vec<Notification>, i64)> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total: i64 = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .count()
        .get_result(&mut conn)?;

    let items = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .order(notifications::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load::<Notification>(&mut conn)?;

    Ok((items, total))
}

/// Count unread notifications for a user.
pub fn count_unread(pool: &DbPool, user_id: i32) -> AppResult<i64> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let count: i64 = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .filter(notifications::is_read.eq(false))
        .count()
        .get_result(&mut conn)?;

    Ok(count)
}

/// Mark a single notification as read (only if it belongs to the user).
pub fn mark_read(pool: &DbPool, notification_id: i32, user_id: i32) -> AppResult<Notification> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let notification = diesel::update(
        notifications::table
            .filter(notifications::id.eq(notification_id))
            .filter(notifications::user_id.eq(user_id)),
    )
    .set((
        notifications::is_read.eq(true),
        notifications::updated_at.eq(diesel::dsl::now),
    ))
    .get_result::<Notification>(&mut conn)
    .map_err(|e| match e {
        diesel::result::Error::NotFound => {
            AppError::new(ErrorCode::NotificationNotFound, "notification not found")
        }
        other => AppError::Database(other),
    })?;

    Ok(notification)
}

/// User-initiated bulk clear; the only way notification rows are removed.
pub fn delete_all(pool: &DbPool, user_id: i32) -> AppResult<usize> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let removed = diesel::delete(notifications::table.filter(notifications::user_id.eq(user_id)))
        .execute(&mut conn)?;

    tracing::debug!(user_id = user_id, removed = removed, "cleared notifications");
    Ok(removed)
}
