use crate::models::{DashboardView, Item, ItemType, ItemView, Mode, Status};
use chrono::{Local, NaiveDate};

const UPCOMING_LIMIT: usize = 5;

pub fn build_dashboard(items: &[Item], mode: Mode) -> DashboardView {
    build_dashboard_at(Local::now().date_naive(), items, mode)
}

pub fn build_dashboard_at(today: NaiveDate, items: &[Item], mode: Mode) -> DashboardView {
    let upcoming = select_upcoming(items, mode)
        .into_iter()
        .map(|item| item_view(today, item))
        .collect();

    let all = items
        .iter()
        .filter(|item| item.mode == mode)
        .map(|item| item_view(today, item))
        .collect();

    DashboardView {
        mode,
        upcoming,
        items: all,
        monthly_total: format!("{:.2}", monthly_total(items, mode)),
    }
}

pub fn select_upcoming(items: &[Item], mode: Mode) -> Vec<&Item> {
    let mut upcoming: Vec<&Item> = items
        .iter()
        .filter(|item| item.status == Status::Upcoming && item.mode == mode)
        .collect();
    upcoming.sort_by_key(|item| item.due_date);
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

pub fn monthly_total(items: &[Item], mode: Mode) -> f64 {
    items
        .iter()
        .filter(|item| item.kind == ItemType::Payment && item.mode == mode)
        .map(|item| item.amount)
        .fold(0.0, |total, amount| total + amount)
}

/// Relative phrase for a due date: "Today", "Tomorrow", "Past" or "In N days".
pub fn format_due(today: NaiveDate, due: NaiveDate) -> String {
    match (due - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        days if days < 0 => "Past".to_string(),
        days => format!("In {days} days"),
    }
}

fn item_view(today: NaiveDate, item: &Item) -> ItemView {
    ItemView {
        id: item.id.clone(),
        title: item.title.clone(),
        kind: item.kind,
        due_date: item.due_date,
        due_label: format_due(today, item.due_date),
        amount: (item.kind == ItemType::Payment).then_some(item.amount),
        recurring: item.recurring,
        status: item.status,
        reminder: item.reminder,
    }
}
