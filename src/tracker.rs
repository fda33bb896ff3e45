use crate::dashboard::build_dashboard;
use crate::errors::AppError;
use crate::models::{DashboardView, Item, ItemType, Mode, NewItemRequest, Recurrence, Status};
use crate::recurrence::spawn_successor;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Default)]
pub struct Tracker {
    items: Vec<Item>,
    mode: Mode,
    last_id: i64,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub item: Item,
    pub successor: Option<Item>,
}

impl Tracker {
    pub fn new(items: Vec<Item>) -> Self {
        let last_id = items
            .iter()
            .filter_map(|item| item.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            items,
            mode: Mode::default(),
            last_id,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn dashboard(&self) -> DashboardView {
        build_dashboard(&self.items, self.mode)
    }

    pub fn add_item(&mut self, request: NewItemRequest, now: DateTime<Utc>) -> Result<Item, AppError> {
        let fields = validate(request)?;
        let item = Item {
            id: self.next_id(now),
            title: fields.title,
            kind: fields.kind,
            due_date: fields.due_date,
            amount: fields.amount,
            recurring: fields.recurring,
            status: Status::Upcoming,
            reminder: fields.reminder,
            mode: fields.mode,
            created_at: now,
            recurring_processed: false,
        };
        self.items.push(item.clone());
        Ok(item)
    }

    pub fn mark_done(&mut self, id: &str, now: DateTime<Utc>) -> Result<Completion, AppError> {
        let index = self.position(id)?;
        let successor_id = self.next_id(now);

        let item = &mut self.items[index];
        item.status = Status::Done;
        let successor = spawn_successor(item, successor_id);
        let item = item.clone();

        if let Some(next) = &successor {
            self.items.push(next.clone());
        }
        Ok(Completion { item, successor })
    }

    pub fn delete(&mut self, id: &str) -> Result<Item, AppError> {
        let index = self.position(id)?;
        Ok(self.items.remove(index))
    }

    fn position(&self, id: &str) -> Result<usize, AppError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| AppError::not_found(format!("no item with id '{id}'")))
    }

    // Millisecond timestamp, bumped past the last issued id so ids never repeat.
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let id = now.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }
}

struct ItemFields {
    title: String,
    kind: ItemType,
    due_date: NaiveDate,
    amount: f64,
    recurring: Option<Recurrence>,
    reminder: bool,
    mode: Mode,
}

fn validate(request: NewItemRequest) -> Result<ItemFields, AppError> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::bad_request("title is required"));
    }

    let kind = ItemType::parse(&request.kind)
        .ok_or_else(|| AppError::bad_request("type must be 'task' or 'payment'"))?;
    let mode = Mode::parse(&request.mode)
        .ok_or_else(|| AppError::bad_request("mode must be 'personal' or 'business'"))?;
    let due_date = NaiveDate::parse_from_str(request.due_date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("dueDate must be a YYYY-MM-DD date"))?;

    let amount = request.amount.map(|value| value.as_amount()).unwrap_or(0.0);

    Ok(ItemFields {
        title,
        kind,
        due_date,
        amount,
        recurring: request.recurring.as_deref().and_then(Recurrence::parse),
        reminder: request.reminder.is_some_and(|value| value.as_flag()),
        mode,
    })
}
