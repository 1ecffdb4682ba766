//! Scheduled watering reminders.
//!
//! Six recurring triggers ({regular, customized} x {Day, Week, Month}) run as
//! plain tokio tasks next to the HTTP server. Each tick reads due reminders,
//! resolves recipients, and hands (user, plant) pairs to the [`Dispatcher`].
//! Every failure inside a tick is logged and contained; nothing here ever
//! reaches an API caller, and a tick missed while the process is down is
//! skipped rather than backfilled.

pub mod dispatch;
pub mod store;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use tokio::task::JoinHandle;

use sprout_shared::types::schedule::{parse_time_list, Cadence, WallTime};

use crate::models::PlantReminder;
use dispatch::{Dispatcher, PushClient, CUSTOMIZED_TITLE, REGULAR_TITLE};
use store::ReminderStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerKind {
    Regular,
    Customized,
}

pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    dispatcher: Dispatcher,
    zone: FixedOffset,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        push: Arc<dyn PushClient>,
        zone: FixedOffset,
        push_timeout: StdDuration,
    ) -> Self {
        let dispatcher = Dispatcher::new(Arc::clone(&store), push, push_timeout);
        Self { store, dispatcher, zone }
    }

    /// Spawns the trigger loops. Aborting the returned handles stops the
    /// scheduler; there is no other shared state to tear down.
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(Cadence::ALL.len() * 2);
        for cadence in Cadence::ALL {
            for kind in [TriggerKind::Regular, TriggerKind::Customized] {
                let scheduler = Arc::clone(self);
                handles.push(tokio::spawn(async move {
                    scheduler.run_trigger(kind, cadence).await;
                }));
            }
        }
        tracing::info!(zone = %self.zone, "reminder scheduler started");
        handles
    }

    async fn run_trigger(&self, kind: TriggerKind, cadence: Cadence) {
        loop {
            let now = Utc::now().with_timezone(&self.zone);
            let fire_at = next_fire_after(now, cadence);
            let wait = (fire_at - now).to_std().unwrap_or(StdDuration::ZERO);
            tokio::time::sleep(wait).await;

            let at = WallTime::of(&fire_at);
            tracing::debug!(kind = ?kind, cadence = %cadence, at = %at, "reminder tick");
            match kind {
                TriggerKind::Regular => self.tick_regular(cadence, at).await,
                TriggerKind::Customized => self.tick_customized(cadence, at).await,
            }
        }
    }

    /// One evaluation of the regular (per-plant) reminders for a cadence.
    ///
    /// The store filters on the cadence tag only; the exact-time match
    /// against the `watering_time` list happens here. Each matching plant
    /// fans out to every tracking user, sequentially.
    pub async fn tick_regular(&self, cadence: Cadence, at: WallTime) {
        let due = match self.store.plants_with_cadence(cadence) {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(cadence = %cadence, error = %e, "failed to fetch plants for tick");
                return;
            }
        };

        for (plant, reminder) in due {
            if !regular_reminder_is_due(&reminder, at) {
                continue;
            }

            let trackers = match self.store.trackers(plant.id) {
                Ok(trackers) => trackers,
                Err(e) => {
                    tracing::error!(plant_id = plant.id, error = %e, "failed to resolve trackers, skipping plant");
                    continue;
                }
            };

            for user in trackers {
                if let Err(e) = self.dispatcher.dispatch(&user, &plant, REGULAR_TITLE).await {
                    tracing::error!(
                        user_id = user.id,
                        plant_id = plant.id,
                        error = %e,
                        "failed to store watering notification"
                    );
                }
            }
        }
    }

    /// One evaluation of the customized reminders for a cadence.
    ///
    /// The store matches cadence and exact time in one query. A successful
    /// dispatch consumes a non-recurring reminder; if the delete fails it is
    /// only logged, so the reminder fires again on the next matching tick.
    pub async fn tick_customized(&self, cadence: Cadence, at: WallTime) {
        let due = match self.store.due_customized(cadence, at) {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(cadence = %cadence, error = %e, "failed to fetch customized reminders for tick");
                return;
            }
        };

        for item in due {
            if let Err(e) = self.dispatcher.dispatch(&item.user, &item.plant, CUSTOMIZED_TITLE).await {
                tracing::error!(
                    reminder_id = item.reminder.id,
                    error = %e,
                    "failed to store customized watering notification"
                );
                continue;
            }

            if !item.reminder.recurring {
                if let Err(e) = self.store.delete_customized(item.reminder.id) {
                    tracing::error!(
                        reminder_id = item.reminder.id,
                        error = %e,
                        "failed to delete one-shot reminder, it will fire again next matching tick"
                    );
                }
            }
        }
    }
}

/// Whether a regular reminder's `watering_time` list contains the current
/// time. Malformed entries are logged and skipped; an empty or fully
/// malformed list never matches.
fn regular_reminder_is_due(reminder: &PlantReminder, at: WallTime) -> bool {
    let mut due = false;
    for entry in parse_time_list(&reminder.watering_time) {
        match entry {
            Ok(time) if time == at => due = true,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(plant_id = reminder.plant_id, error = %e, "skipping malformed watering time entry");
            }
        }
    }
    due
}

/// The first trigger instant strictly after `now` for a cadence: top of the
/// next hour, next Sunday 00:00, or the 1st of the next month 00:00, all in
/// the scheduler's fixed zone.
pub fn next_fire_after(now: DateTime<FixedOffset>, cadence: Cadence) -> DateTime<FixedOffset> {
    match cadence {
        Cadence::Day => truncate_to_hour(now) + Duration::hours(1),
        Cadence::Week => {
            let midnight = truncate_to_midnight(now);
            let days_ahead = (7 - now.weekday().num_days_from_sunday() as i64) % 7;
            let candidate = midnight + Duration::days(days_ahead);
            if candidate <= now {
                candidate + Duration::days(7)
            } else {
                candidate
            }
        }
        Cadence::Month => {
            let (year, month) = if now.month() == 12 {
                (now.year() + 1, 1)
            } else {
                (now.year(), now.month() + 1)
            };
            let first = NaiveDate::from_ymd_opt(year, month, 1)
                .expect("first of month is a valid date")
                .and_hms_opt(0, 0, 0)
                .expect("midnight is a valid time");
            now.timezone()
                .from_local_datetime(&first)
                .single()
                .expect("fixed offset times are unambiguous")
        }
    }
}

fn truncate_to_hour(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("zeroed time fields are in range")
}

fn truncate_to_midnight(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    truncate_to_hour(t).with_hour(0).expect("midnight is in range")
}

#[cfg(test)]
mod tests {
    use super::dispatch::PushClient;
    use super::store::{DueCustomReminder, ReminderStore, StoreError};
    use super::*;
    use crate::models::{CustomizeWateringReminder, NewNotification, Plant, User};

    use async_trait::async_trait;
    use sprout_shared::clients::push::PushError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn jakarta() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn at(hour: u8, minute: u8) -> WallTime {
        WallTime::new(hour, minute).unwrap()
    }

    fn user(id: i32, name: &str, token: Option<&str>) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
            fcm_token: token.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn plant(id: i32, name: &str) -> Plant {
        Plant {
            id,
            name: name.to_string(),
            description: String::new(),
            is_toxic: false,
            harvest_duration: 90,
            sunlight: "full".to_string(),
            planting_time: "spring".to_string(),
            plant_category_id: 1,
            climate_condition: "tropical".to_string(),
            additional_tips: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn schedule(plant_id: i32, cadence: Cadence, watering_time: &str) -> PlantReminder {
        PlantReminder {
            id: plant_id,
            plant_id,
            watering_frequency: 2,
            each: cadence.as_str().to_string(),
            watering_amount: 250,
            unit: "ml".to_string(),
            watering_time: watering_time.to_string(),
            weather_condition: "Sunny".to_string(),
            condition_description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn customized(
        id: i32,
        user: &User,
        plant: &Plant,
        cadence: Cadence,
        time: &str,
        recurring: bool,
    ) -> DueCustomReminder {
        DueCustomReminder {
            reminder: CustomizeWateringReminder {
                id,
                user_id: user.id,
                plant_id: plant.id,
                time: time.to_string(),
                recurring,
                reminder_type: cadence.as_str().to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            user: user.clone(),
            plant: plant.clone(),
        }
    }

    #[derive(Default)]
    struct FakeStore {
        plants: Vec<(Plant, PlantReminder)>,
        trackers: HashMap<i32, Vec<User>>,
        customized: Vec<DueCustomReminder>,
        fail_trackers_for: Option<i32>,
        fail_delete: bool,
        notifications: Mutex<Vec<NewNotification>>,
        deleted: Mutex<Vec<i32>>,
    }

    impl FakeStore {
        fn notifications(&self) -> Vec<NewNotification> {
            self.notifications.lock().unwrap().clone()
        }

        fn deleted(&self) -> Vec<i32> {
            self.deleted.lock().unwrap().clone()
        }

        fn get_customized(&self, id: i32) -> Option<CustomizeWateringReminder> {
            if self.deleted().contains(&id) {
                return None;
            }
            self.customized
                .iter()
                .find(|item| item.reminder.id == id)
                .map(|item| item.reminder.clone())
        }
    }

    impl ReminderStore for FakeStore {
        fn plants_with_cadence(&self, cadence: Cadence) -> Result<Vec<(Plant, PlantReminder)>, StoreError> {
            Ok(self
                .plants
                .iter()
                .filter(|(_, r)| r.each == cadence.as_str())
                .cloned()
                .collect())
        }

        fn trackers(&self, plant_id: i32) -> Result<Vec<User>, StoreError> {
            if self.fail_trackers_for == Some(plant_id) {
                return Err(StoreError::Pool("connection refused".to_string()));
            }
            Ok(self.trackers.get(&plant_id).cloned().unwrap_or_default())
        }

        fn due_customized(&self, cadence: Cadence, at: WallTime) -> Result<Vec<DueCustomReminder>, StoreError> {
            let deleted = self.deleted();
            Ok(self
                .customized
                .iter()
                .filter(|item| {
                    item.reminder.reminder_type == cadence.as_str()
                        && item.reminder.time == at.to_string()
                        && !deleted.contains(&item.reminder.id)
                })
                .cloned()
                .collect())
        }

        fn insert_notification(&self, notification: NewNotification) -> Result<(), StoreError> {
            self.notifications.lock().unwrap().push(notification);
            Ok(())
        }

        fn delete_customized(&self, reminder_id: i32) -> Result<(), StoreError> {
            if self.fail_delete {
                return Err(StoreError::Pool("connection refused".to_string()));
            }
            self.deleted.lock().unwrap().push(reminder_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePush {
        fail: bool,
        sent: Mutex<Vec<String>>,
    }

    impl FakePush {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushClient for FakePush {
        async fn send(&self, device_token: &str, _title: &str, _body: &str) -> Result<(), PushError> {
            if self.fail {
                return Err(PushError::Provider {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            self.sent.lock().unwrap().push(device_token.to_string());
            Ok(())
        }
    }

    fn scheduler(store: Arc<FakeStore>, push: Arc<FakePush>) -> ReminderScheduler {
        ReminderScheduler::new(store, push, jakarta(), StdDuration::from_secs(1))
    }

    #[tokio::test]
    async fn regular_tick_notifies_each_tracker_at_exact_time() {
        let basil = plant(5, "Basil");
        let store = Arc::new(FakeStore {
            plants: vec![(basil, schedule(5, Cadence::Day, "06:00, 18:00"))],
            trackers: HashMap::from([(5, vec![user(1, "ayu", Some("tok-1")), user(2, "budi", Some("tok-2"))])]),
            ..Default::default()
        });
        let push = Arc::new(FakePush::default());
        let sched = scheduler(store.clone(), push.clone());

        sched.tick_regular(Cadence::Day, at(6, 0)).await;

        let rows = store.notifications();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|n| n.title == REGULAR_TITLE && n.plant_id == 5 && !n.is_read));
        assert_eq!(push.sent(), vec!["tok-1", "tok-2"]);

        // Off-by-a-minute and wrong-hour ticks must not match.
        sched.tick_regular(Cadence::Day, at(6, 1)).await;
        sched.tick_regular(Cadence::Day, at(7, 0)).await;
        assert_eq!(store.notifications().len(), 2);
    }

    #[tokio::test]
    async fn regular_tick_ignores_other_cadences() {
        let store = Arc::new(FakeStore {
            plants: vec![(plant(5, "Basil"), schedule(5, Cadence::Week, "06:00"))],
            trackers: HashMap::from([(5, vec![user(1, "ayu", Some("tok-1"))])]),
            ..Default::default()
        });
        let sched = scheduler(store.clone(), Arc::new(FakePush::default()));

        sched.tick_regular(Cadence::Day, at(6, 0)).await;
        assert!(store.notifications().is_empty());

        sched.tick_regular(Cadence::Week, at(6, 0)).await;
        assert_eq!(store.notifications().len(), 1);
    }

    #[tokio::test]
    async fn plant_without_trackers_creates_no_notifications() {
        let store = Arc::new(FakeStore {
            plants: vec![(plant(5, "Basil"), schedule(5, Cadence::Day, "06:00"))],
            ..Default::default()
        });
        let push = Arc::new(FakePush::default());
        let sched = scheduler(store.clone(), push.clone());

        sched.tick_regular(Cadence::Day, at(6, 0)).await;

        assert!(store.notifications().is_empty());
        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn malformed_watering_time_skips_only_that_plant() {
        let store = Arc::new(FakeStore {
            plants: vec![
                (plant(1, "Fern"), schedule(1, Cadence::Day, "6 AM")),
                (plant(2, "Mint"), schedule(2, Cadence::Day, "06:00")),
            ],
            trackers: HashMap::from([
                (1, vec![user(1, "ayu", Some("tok-1"))]),
                (2, vec![user(2, "budi", Some("tok-2"))]),
            ]),
            ..Default::default()
        });
        let sched = scheduler(store.clone(), Arc::new(FakePush::default()));

        sched.tick_regular(Cadence::Day, at(6, 0)).await;

        let rows = store.notifications();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plant_id, 2);
    }

    #[tokio::test]
    async fn tracker_lookup_failure_does_not_abort_the_tick() {
        let store = Arc::new(FakeStore {
            plants: vec![
                (plant(1, "Fern"), schedule(1, Cadence::Day, "06:00")),
                (plant(2, "Mint"), schedule(2, Cadence::Day, "06:00")),
            ],
            trackers: HashMap::from([(2, vec![user(2, "budi", Some("tok-2"))])]),
            fail_trackers_for: Some(1),
            ..Default::default()
        });
        let sched = scheduler(store.clone(), Arc::new(FakePush::default()));

        sched.tick_regular(Cadence::Day, at(6, 0)).await;

        let rows = store.notifications();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plant_id, 2);
    }

    #[tokio::test]
    async fn push_failure_still_persists_the_notification() {
        let store = Arc::new(FakeStore {
            plants: vec![(plant(5, "Basil"), schedule(5, Cadence::Day, "06:00"))],
            trackers: HashMap::from([(5, vec![user(1, "ayu", Some("tok-1"))])]),
            ..Default::default()
        });
        let push = Arc::new(FakePush { fail: true, ..Default::default() });
        let sched = scheduler(store.clone(), push.clone());

        sched.tick_regular(Cadence::Day, at(6, 0)).await;

        assert_eq!(store.notifications().len(), 1);
        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_device_token_skips_push_but_persists() {
        let store = Arc::new(FakeStore {
            plants: vec![(plant(5, "Basil"), schedule(5, Cadence::Day, "06:00"))],
            trackers: HashMap::from([(5, vec![user(1, "ayu", None)])]),
            ..Default::default()
        });
        let push = Arc::new(FakePush::default());
        let sched = scheduler(store.clone(), push.clone());

        sched.tick_regular(Cadence::Day, at(6, 0)).await;

        assert_eq!(store.notifications().len(), 1);
        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn one_shot_customized_reminder_is_consumed() {
        let ayu = user(1, "ayu", Some("tok-1"));
        let basil = plant(5, "Basil");
        let store = Arc::new(FakeStore {
            customized: vec![customized(9, &ayu, &basil, Cadence::Week, "08:00", false)],
            ..Default::default()
        });
        let sched = scheduler(store.clone(), Arc::new(FakePush::default()));

        sched.tick_customized(Cadence::Week, at(8, 0)).await;

        assert_eq!(store.notifications().len(), 1);
        assert_eq!(store.notifications()[0].title, CUSTOMIZED_TITLE);
        assert_eq!(store.deleted(), vec![9]);
        assert!(store.get_customized(9).is_none());

        // Consumed reminder must not fire on a later matching tick.
        sched.tick_customized(Cadence::Week, at(8, 0)).await;
        assert_eq!(store.notifications().len(), 1);
    }

    #[tokio::test]
    async fn recurring_customized_reminder_survives_dispatch() {
        let ayu = user(1, "ayu", Some("tok-1"));
        let basil = plant(5, "Basil");
        let store = Arc::new(FakeStore {
            customized: vec![customized(9, &ayu, &basil, Cadence::Day, "08:00", true)],
            ..Default::default()
        });
        let sched = scheduler(store.clone(), Arc::new(FakePush::default()));

        sched.tick_customized(Cadence::Day, at(8, 0)).await;
        assert_eq!(store.notifications().len(), 1);
        assert!(store.deleted().is_empty());
        assert_eq!(store.get_customized(9).map(|r| r.id), Some(9));

        // Still eligible on the next matching tick.
        sched.tick_customized(Cadence::Day, at(8, 0)).await;
        assert_eq!(store.notifications().len(), 2);
    }

    #[tokio::test]
    async fn customized_tick_dispatches_only_exact_matches() {
        let ayu = user(1, "ayu", Some("tok-1"));
        let basil = plant(5, "Basil");
        let store = Arc::new(FakeStore {
            customized: vec![
                customized(1, &ayu, &basil, Cadence::Week, "08:00", true),
                customized(2, &ayu, &basil, Cadence::Week, "09:00", true),
                customized(3, &ayu, &basil, Cadence::Day, "08:00", true),
            ],
            ..Default::default()
        });
        let sched = scheduler(store.clone(), Arc::new(FakePush::default()));

        sched.tick_customized(Cadence::Week, at(8, 0)).await;

        assert_eq!(store.notifications().len(), 1);
    }

    #[tokio::test]
    async fn failed_delete_leaves_one_shot_reminder_in_place() {
        let ayu = user(1, "ayu", Some("tok-1"));
        let basil = plant(5, "Basil");
        let store = Arc::new(FakeStore {
            customized: vec![customized(9, &ayu, &basil, Cadence::Week, "08:00", false)],
            fail_delete: true,
            ..Default::default()
        });
        let sched = scheduler(store.clone(), Arc::new(FakePush::default()));

        sched.tick_customized(Cadence::Week, at(8, 0)).await;

        // Dispatch happened, delete did not; the reminder fires again.
        assert_eq!(store.notifications().len(), 1);
        assert!(store.deleted().is_empty());
        assert!(store.get_customized(9).is_some());
    }

    #[test]
    fn due_check_matches_any_entry_in_the_list() {
        let reminder = schedule(5, Cadence::Day, "06:00, 18:00");
        assert!(regular_reminder_is_due(&reminder, at(6, 0)));
        assert!(regular_reminder_is_due(&reminder, at(18, 0)));
        assert!(!regular_reminder_is_due(&reminder, at(6, 1)));
        assert!(!regular_reminder_is_due(&reminder, at(7, 0)));
    }

    #[test]
    fn due_check_never_matches_empty_or_malformed_lists() {
        assert!(!regular_reminder_is_due(&schedule(5, Cadence::Day, ""), at(6, 0)));
        assert!(!regular_reminder_is_due(&schedule(5, Cadence::Day, "morning"), at(6, 0)));
    }

    #[test]
    fn hourly_trigger_fires_at_the_top_of_the_next_hour() {
        let zone = jakarta();
        let now = zone.with_ymd_and_hms(2024, 6, 1, 6, 15, 30).unwrap();
        assert_eq!(next_fire_after(now, Cadence::Day), zone.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap());

        // Exactly on the hour advances a full hour.
        let on_the_hour = zone.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        assert_eq!(next_fire_after(on_the_hour, Cadence::Day), zone.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap());
    }

    #[test]
    fn weekly_trigger_fires_next_sunday_midnight() {
        let zone = jakarta();
        // 2024-06-05 is a Wednesday; 2024-06-09 the following Sunday.
        let wednesday = zone.with_ymd_and_hms(2024, 6, 5, 10, 0, 0).unwrap();
        assert_eq!(next_fire_after(wednesday, Cadence::Week), zone.with_ymd_and_hms(2024, 6, 9, 0, 0, 0).unwrap());

        // Sunday after midnight waits a full week.
        let sunday_morning = zone.with_ymd_and_hms(2024, 6, 9, 0, 0, 0).unwrap();
        assert_eq!(next_fire_after(sunday_morning, Cadence::Week), zone.with_ymd_and_hms(2024, 6, 16, 0, 0, 0).unwrap());
    }

    #[test]
    fn monthly_trigger_fires_first_of_next_month() {
        let zone = jakarta();
        let mid_june = zone.with_ymd_and_hms(2024, 6, 15, 23, 59, 0).unwrap();
        assert_eq!(next_fire_after(mid_june, Cadence::Month), zone.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());

        let december = zone.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(next_fire_after(december, Cadence::Month), zone.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}
