use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use sprout_shared::clients::push::{FcmClient, PushError};

use crate::models::{NewNotification, Plant, User};
use crate::scheduler::store::{ReminderStore, StoreError};

pub const REGULAR_TITLE: &str = "Watering Reminder";
pub const CUSTOMIZED_TITLE: &str = "Customize Watering Reminder";

/// Outbound push delivery, abstracted so tests can fake the provider.
#[async_trait]
pub trait PushClient: Send + Sync {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), PushError>;
}

#[async_trait]
impl PushClient for FcmClient {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), PushError> {
        FcmClient::send(self, device_token, title, body).await
    }
}

/// Delivers one reminder to one user: best-effort push, then a Notification
/// row no matter what.
///
/// The row is the source of truth for the in-app notification center, so a
/// provider outage or a missing device token never suppresses it. Only a
/// failed insert is an error to the caller.
pub struct Dispatcher {
    store: Arc<dyn ReminderStore>,
    push: Arc<dyn PushClient>,
    push_timeout: Duration,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ReminderStore>, push: Arc<dyn PushClient>, push_timeout: Duration) -> Self {
        Self { store, push, push_timeout }
    }

    pub async fn dispatch(&self, user: &User, plant: &Plant, title: &str) -> Result<(), StoreError> {
        let body = format!("Hiii {}, It's time to water your plant: {}", user.name, plant.name);

        match &user.fcm_token {
            Some(token) => {
                match tokio::time::timeout(self.push_timeout, self.push.send(token, title, &body)).await {
                    Ok(Ok(())) => {
                        tracing::debug!(user_id = user.id, plant_id = plant.id, "push delivered");
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(
                            user_id = user.id,
                            plant_id = plant.id,
                            error = %e,
                            "push delivery failed, storing notification anyway"
                        );
                    }
                    Err(_) => {
                        tracing::warn!(
                            user_id = user.id,
                            plant_id = plant.id,
                            timeout_secs = self.push_timeout.as_secs(),
                            "push delivery timed out, storing notification anyway"
                        );
                    }
                }
            }
            None => {
                tracing::debug!(user_id = user.id, "user has no device token, skipping push");
            }
        }

        self.store.insert_notification(NewNotification {
            title: title.to_string(),
            body,
            user_id: user.id,
            plant_id: plant.id,
            is_read: false,
        })
    }
}
