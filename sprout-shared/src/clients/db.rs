use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Builds the r2d2 pool the whole service shares. Sizing comes from the
/// caller's config; the HTTP handlers and the reminder scheduler draw from
/// the same pool, so `max_size` bounds both.
pub fn create_pool(database_url: &str, max_size: u32, min_idle: u32) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .min_idle(Some(min_idle))
        .test_on_check_out(true)
        .build(manager)
        .expect("failed to create database pool");

    tracing::info!(max_size = max_size, min_idle = min_idle, "database pool ready");
    pool
}
