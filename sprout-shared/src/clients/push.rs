use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Errors from the push provider, kept separate from persistence errors so
/// the dispatcher can log a failed push and still store the notification.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("push provider rejected the message ({status}): {body}")]
    Provider { status: u16, body: String },
}

/// Thin client for the FCM HTTP send endpoint.
///
/// Every call is bounded by the timeout given at construction; a slow
/// provider can never stall a scheduler tick past that.
#[derive(Clone)]
pub struct FcmClient {
    client: Client,
    server_key: String,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    to: &'a str,
    notification: FcmNotification<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

impl FcmClient {
    pub fn new(server_key: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build push http client");

        Self {
            client,
            server_key: server_key.to_string(),
        }
    }

    pub async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), PushError> {
        let message = FcmMessage {
            to: device_token,
            notification: FcmNotification { title, body },
        };

        let response = self
            .client
            .post(FCM_SEND_URL)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(title = %title, "push message accepted by provider");
        Ok(())
    }
}
