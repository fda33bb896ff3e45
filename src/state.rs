use crate::config::NotificationPermission;
use crate::errors::AppError;
use crate::models::{DashboardView, Item, Mode, NewItemRequest};
use crate::reminders::{NotificationFeed, ReminderService};
use crate::storage::ItemRepository;
use crate::tracker::{Completion, Tracker};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<Tracker>>,
    pub repository: Arc<dyn ItemRepository>,
    pub reminders: Arc<Mutex<ReminderService>>,
    pub notifications: Arc<NotificationFeed>,
}

impl AppState {
    pub fn new(
        items: Vec<Item>,
        repository: Arc<dyn ItemRepository>,
        permission: NotificationPermission,
    ) -> Self {
        let notifications = Arc::new(NotificationFeed::default());
        let reminders = ReminderService::new(permission, notifications.clone());
        Self {
            tracker: Arc::new(Mutex::new(Tracker::new(items))),
            repository,
            reminders: Arc::new(Mutex::new(reminders)),
            notifications,
        }
    }

    pub async fn load(
        repository: Arc<dyn ItemRepository>,
        permission: NotificationPermission,
    ) -> Result<Self, AppError> {
        let items = repository.load().await?;
        info!(count = items.len(), "loaded items");
        Ok(Self::new(items, repository, permission))
    }

    pub async fn dashboard(&self) -> DashboardView {
        self.tracker.lock().await.dashboard()
    }

    pub async fn items(&self) -> Vec<Item> {
        self.tracker.lock().await.items().to_vec()
    }

    pub async fn create_item(&self, request: NewItemRequest) -> Result<Item, AppError> {
        let mut tracker = self.tracker.lock().await;
        let mut staged = tracker.clone();
        let item = staged.add_item(request, Utc::now())?;
        self.repository.save_all(staged.items()).await?;
        *tracker = staged;
        info!(id = %item.id, mode = %item.mode, "item added");
        Ok(item)
    }

    pub async fn complete_item(&self, id: &str) -> Result<Completion, AppError> {
        let mut tracker = self.tracker.lock().await;
        let mut staged = tracker.clone();
        let completion = staged.mark_done(id, Utc::now())?;
        self.repository.save_all(staged.items()).await?;
        *tracker = staged;
        match &completion.successor {
            Some(next) => info!(id, next_id = %next.id, due = %next.due_date, "item done, next occurrence added"),
            None => info!(id, "item done"),
        }
        Ok(completion)
    }

    pub async fn delete_item(&self, id: &str) -> Result<Item, AppError> {
        let mut tracker = self.tracker.lock().await;
        let mut staged = tracker.clone();
        let removed = staged.delete(id)?;
        self.repository.save_all(staged.items()).await?;
        *tracker = staged;
        info!(id, "item deleted");
        Ok(removed)
    }

    pub async fn set_mode(&self, mode: Mode) -> DashboardView {
        let mut tracker = self.tracker.lock().await;
        tracker.set_mode(mode);
        tracker.dashboard()
    }
}
