use crate::models::{Item, Recurrence, Status};
use chrono::{Datelike, Days, NaiveDate};

/// Month and year steps keep the day of month and overflow into the next
/// month when the target is shorter: 2024-01-31 plus one month is 2024-03-02.
pub fn next_due_date(date: NaiveDate, period: Recurrence) -> Option<NaiveDate> {
    match period {
        Recurrence::Daily => date.checked_add_days(Days::new(1)),
        Recurrence::Weekly => date.checked_add_days(Days::new(7)),
        Recurrence::Monthly => add_months_overflowing(date, 1),
        Recurrence::Yearly => add_months_overflowing(date, 12),
    }
}

fn add_months_overflowing(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let first = NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1)?;
    first.checked_add_days(Days::new(u64::from(date.day() - 1)))
}

pub fn spawn_successor(done: &mut Item, id: String) -> Option<Item> {
    if done.status != Status::Done || done.recurring_processed {
        return None;
    }
    let period = done.recurring?;
    let due_date = next_due_date(done.due_date, period)?;

    let successor = Item {
        id,
        due_date,
        status: Status::Upcoming,
        recurring_processed: false,
        ..done.clone()
    };
    done.recurring_processed = true;
    Some(successor)
}
