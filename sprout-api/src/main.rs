use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::FixedOffset;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod scheduler;
mod schema;
mod services;

use config::AppConfig;
use sprout_shared::clients::db::{create_pool, DbPool};
use sprout_shared::clients::push::FcmClient;

use scheduler::store::PgReminderStore;
use scheduler::ReminderScheduler;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sprout_shared::middleware::init_tracing("sprout-api");

    let config = AppConfig::load()?;
    let port = config.port;

    // The auth extractor reads the secret from the environment.
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let db = create_pool(&config.database_url, config.db_pool_max, config.db_pool_min_idle);

    let zone = FixedOffset::east_opt(config.reminder_utc_offset_hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("invalid reminder_utc_offset_hours"))?;
    let push_timeout = Duration::from_secs(config.push_timeout_secs);

    let store = Arc::new(PgReminderStore::new(db.clone()));
    let push = Arc::new(FcmClient::new(&config.fcm_server_key, push_timeout));
    let scheduler = Arc::new(ReminderScheduler::new(store, push, zone, push_timeout));
    let _trigger_handles = scheduler.start();

    let state = Arc::new(AppState { db, config });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/device-token", put(routes::auth::update_device_token))
        .route("/plants", get(routes::plants::list_plants).post(routes::plants::create_plant))
        .route(
            "/plants/:id",
            get(routes::plants::get_plant)
                .put(routes::plants::update_plant)
                .delete(routes::plants::delete_plant),
        )
        .route(
            "/plant-categories",
            get(routes::plants::list_categories).post(routes::plants::create_category),
        )
        .route(
            "/my/plants",
            get(routes::user_plants::list_my_plants).post(routes::user_plants::add_my_plant),
        )
        .route("/my/plants/:id", delete(routes::user_plants::remove_my_plant))
        .route("/my/plants/:id/customize-name", put(routes::user_plants::rename_my_plant))
        .route(
            "/reminders/customized",
            get(routes::reminders::list_reminders).post(routes::reminders::create_reminder),
        )
        .route("/reminders/customized/:id", delete(routes::reminders::delete_reminder))
        .route(
            "/notifications",
            get(routes::notifications::list_notifications)
                .delete(routes::notifications::clear_notifications),
        )
        .route("/notifications/unread-count", get(routes::notifications::unread_count))
        .route("/notifications/:id/read", post(routes::notifications::mark_read))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "sprout-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
