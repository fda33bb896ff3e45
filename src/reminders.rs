use crate::config::NotificationPermission;
use crate::dashboard::format_due;
use crate::models::{Item, Notification, Status};
use crate::state::AppState;
use chrono::{Local, NaiveDateTime, NaiveTime, Utc};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

pub const REMINDER_TITLE: &str = "Clario Reminder";

// Reminders fire when the due date is in (23.99, 24] hours. An hourly tick can
// step over this window entirely; that gap is known and kept.
const WINDOW_UPPER_HOURS: f64 = 24.0;
const WINDOW_LOWER_HOURS: f64 = 23.99;

const FEED_CAPACITY: usize = 100;

pub trait Notifier: Send + Sync {
    fn notify(&self, item_id: &str, title: &str, body: &str);
}

/// Keeps recently fired notifications for the page to poll.
///
/// Sequence numbers start from the process start time in milliseconds, so a
/// page still holding the last number seen before a restart keeps receiving
/// new entries.
pub struct NotificationFeed {
    inner: Mutex<FeedInner>,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::starting_after(Utc::now().timestamp_millis().max(0) as u64)
    }
}

#[derive(Default)]
struct FeedInner {
    next_seq: u64,
    entries: VecDeque<Notification>,
}

impl NotificationFeed {
    pub fn starting_after(seq: u64) -> Self {
        Self {
            inner: Mutex::new(FeedInner {
                next_seq: seq,
                entries: VecDeque::new(),
            }),
        }
    }

    pub fn since(&self, after: u64) -> Vec<Notification> {
        match self.inner.lock() {
            Ok(inner) => inner
                .entries
                .iter()
                .filter(|entry| entry.seq > after)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Notifier for NotificationFeed {
    fn notify(&self, item_id: &str, title: &str, body: &str) {
        info!(item_id, "{title}: {body}");
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner.entries.push_back(Notification {
            seq,
            item_id: item_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            fired_at: Utc::now(),
        });
        while inner.entries.len() > FEED_CAPACITY {
            inner.entries.pop_front();
        }
    }
}

pub fn hours_until_due(due: chrono::NaiveDate, now: NaiveDateTime) -> f64 {
    let remaining = due.and_time(NaiveTime::MIN) - now;
    remaining.num_milliseconds() as f64 / 3_600_000.0
}

/// Upcoming reminder items whose due time is just under a day away.
pub fn due_for_reminder(items: &[Item], now: NaiveDateTime) -> Vec<&Item> {
    items
        .iter()
        .filter(|item| item.reminder && item.status == Status::Upcoming)
        .filter(|item| {
            let hours = hours_until_due(item.due_date, now);
            hours <= WINDOW_UPPER_HOURS && hours > WINDOW_LOWER_HOURS
        })
        .collect()
}

/// Fires each reminder at most once while its item stays upcoming.
pub struct ReminderService {
    permission: NotificationPermission,
    notifier: Arc<dyn Notifier>,
    fired: HashSet<String>,
}

impl ReminderService {
    pub fn new(permission: NotificationPermission, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            permission,
            notifier,
            fired: HashSet::new(),
        }
    }

    /// Runs one check and returns how many notifications were sent.
    pub fn check_at(&mut self, items: &[Item], now: NaiveDateTime) -> usize {
        self.fired.retain(|id| {
            items
                .iter()
                .any(|item| item.id == *id && item.status == Status::Upcoming)
        });

        let mut sent = 0;
        for item in due_for_reminder(items, now) {
            if self.permission == NotificationPermission::Denied {
                debug!(item_id = %item.id, "notifications denied, reminder suppressed");
                continue;
            }
            if !self.fired.insert(item.id.clone()) {
                continue;
            }
            let body = format!("{} is due {}", item.title, format_due(now.date(), item.due_date));
            self.notifier.notify(&item.id, REMINDER_TITLE, &body);
            sent += 1;
        }
        sent
    }
}

pub async fn run_reminder_loop(state: AppState, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately; checks start one interval after startup.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let tracker = state.tracker.lock().await;
        let mut reminders = state.reminders.lock().await;
        let sent = reminders.check_at(tracker.items(), Local::now().naive_local());
        debug!(sent, "reminder check finished");
    }
}
