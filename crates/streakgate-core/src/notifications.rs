//! Engagement prompt feed
//!
//! A short, most-recent-first list of prompts kept in the general store.
//! Only the newest `capacity` entries are kept. Failures are logged and
//! otherwise ignored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Clock;
use crate::error::StoreError;
use crate::store::{RecordStore, NOTIFICATIONS_KEY};

/// Default number of retained notifications
pub const DEFAULT_CAPACITY: usize = 10;

/// Kind of engagement prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    FriendJoined,
    PostMissed,
    AchievementUnlocked,
    StreakReminder,
}

impl NotificationCategory {
    pub const ALL: [NotificationCategory; 4] = [
        NotificationCategory::FriendJoined,
        NotificationCategory::PostMissed,
        NotificationCategory::AchievementUnlocked,
        NotificationCategory::StreakReminder,
    ];
}

/// One feed entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub category: NotificationCategory,
    pub message: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// Capped notification feed
#[derive(Clone)]
pub struct NotificationFeed {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    capacity: usize,
}

impl NotificationFeed {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(store, clock, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            store,
            clock,
            capacity,
        }
    }

    /// Stored notifications, newest first; unreadable reads as empty
    pub async fn list(&self) -> Vec<Notification> {
        match self.load().await {
            Ok(items) => items,
            Err(e) => {
                warn!("Error loading notifications: {}", e);
                Vec::new()
            }
        }
    }

    /// Prepend a notification and drop anything past the capacity
    ///
    /// Ids are the creation time in epoch millis, with a `-n` suffix when
    /// that id is already taken.
    pub async fn add(&self, category: NotificationCategory, message: impl Into<String>) {
        let now = self.clock.now().with_timezone(&Utc);
        let mut items = self.list().await;

        let notification = Notification {
            id: unique_id(&items, now.timestamp_millis()),
            category,
            message: message.into(),
            created_at: now,
            read: false,
        };
        items.insert(0, notification);
        items.truncate(self.capacity);

        if let Err(e) = self.save(&items).await {
            warn!("Error adding notification: {}", e);
        }
    }

    /// Mark the matching notification read; unknown ids are ignored
    pub async fn mark_read(&self, id: &str) {
        let mut items = self.list().await;
        let mut changed = false;
        for item in items.iter_mut().filter(|item| item.id == id) {
            item.read = true;
            changed = true;
        }
        if !changed {
            return;
        }

        if let Err(e) = self.save(&items).await {
            warn!("Error marking notification read: {}", e);
        }
    }

    /// Number of unread notifications
    pub async fn unread_count(&self) -> usize {
        self.list().await.iter().filter(|item| !item.read).count()
    }

    /// Append one randomly chosen daily prompt
    pub async fn generate_daily<R: Rng>(&self, rng: &mut R) -> NotificationCategory {
        let category = *NotificationCategory::ALL
            .choose(rng)
            .unwrap_or(&NotificationCategory::StreakReminder);

        let message = match category {
            NotificationCategory::FriendJoined => {
                format!("{} friends from your contacts joined today!", rng.gen_range(1..=5))
            }
            NotificationCategory::PostMissed => format!(
                "You missed {} posts in communities you're interested in!",
                rng.gen_range(2..=9)
            ),
            NotificationCategory::AchievementUnlocked => {
                "New achievements unlocked! Check your profile to see what you earned.".to_string()
            }
            NotificationCategory::StreakReminder => {
                "Keep your login streak going! Daily check-ins earn bonus points!".to_string()
            }
        };

        self.add(category, message).await;
        category
    }

    async fn load(&self) -> Result<Vec<Notification>, StoreError> {
        match self.store.get(NOTIFICATIONS_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, items: &[Notification]) -> Result<(), StoreError> {
        let contents = serde_json::to_string(items)?;
        self.store.set(NOTIFICATIONS_KEY, &contents).await
    }
}

fn unique_id(items: &[Notification], millis: i64) -> String {
    let base = millis.to_string();
    let taken = |id: &str| items.iter().any(|item| item.id == id);

    if !taken(base.as_str()) {
        return base;
    }
    (1u32..)
        .map(|n| format!("{}-{}", base, n))
        .find(|id| !taken(id.as_str()))
        .unwrap_or_else(|| base.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use chrono::{Duration, Local, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn feed() -> (NotificationFeed, Arc<ManualClock>, Arc<MemoryStore>) {
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryStore::new());
        (
            NotificationFeed::new(store.clone(), clock.clone()),
            clock,
            store,
        )
    }

    #[tokio::test]
    async fn test_newest_first_and_capped() {
        let (feed, clock, _) = feed();
        for i in 0..12 {
            feed.add(NotificationCategory::StreakReminder, format!("n{}", i))
                .await;
            clock.advance(Duration::milliseconds(5));
        }

        let items = feed.list().await;
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].message, "n11");
        assert_eq!(items[9].message, "n2");
        assert!(items.iter().all(|n| !n.read));
    }

    #[tokio::test]
    async fn test_mark_read() {
        let (feed, clock, _) = feed();
        feed.add(NotificationCategory::FriendJoined, "first").await;
        clock.advance(Duration::seconds(1));
        feed.add(NotificationCategory::PostMissed, "second").await;

        let target = feed.list().await[1].id.clone();
        feed.mark_read(&target).await;
        feed.mark_read("no-such-id").await;

        let items = feed.list().await;
        assert!(!items[0].read);
        assert!(items[1].read);
        assert_eq!(feed.unread_count().await, 1);
    }

    #[tokio::test]
    async fn test_wire_shape() {
        let (feed, _, store) = feed();
        feed.add(NotificationCategory::AchievementUnlocked, "hi").await;

        let raw = RecordStore::get(store.as_ref(), NOTIFICATIONS_KEY)
            .await
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["type"], "achievement_unlocked");
        assert_eq!(json[0]["read"], false);
        assert!(json[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_storage_failures_are_quiet() {
        let (feed, _, store) = feed();
        store.fail_writes(true);
        feed.add(NotificationCategory::StreakReminder, "lost").await;
        store.fail_writes(false);
        assert!(feed.list().await.is_empty());

        store.fail_reads(true);
        assert!(feed.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_generate_daily() {
        let (feed, _, _) = feed();
        let mut rng = StdRng::seed_from_u64(7);
        let category = feed.generate_daily(&mut rng).await;

        let items = feed.list().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, category);
        assert!(!items[0].message.is_empty());
    }

    #[tokio::test]
    async fn test_same_millisecond_ids_are_distinct() {
        let (feed, _, _) = feed();
        feed.add(NotificationCategory::FriendJoined, "one").await;
        feed.add(NotificationCategory::PostMissed, "two").await;
        feed.add(NotificationCategory::StreakReminder, "three").await;

        let items = feed.list().await;
        let base = items[2].id.clone();
        assert_eq!(items[1].id, format!("{}-1", base));
        assert_eq!(items[0].id, format!("{}-2", base));

        feed.mark_read(&base).await;
        assert_eq!(feed.unread_count().await, 2);
        assert!(feed.list().await[2].read);
    }
}
