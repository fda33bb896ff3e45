use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Task,
    Payment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Upcoming,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Personal,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ItemType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "task" => Some(Self::Task),
            "payment" => Some(Self::Payment),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Payment => "payment",
        }
    }
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Done => "done",
        }
    }
}

impl Mode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "personal" => Some(Self::Personal),
            "business" => Some(Self::Business),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Business => "business",
        }
    }
}

impl Recurrence {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Field names match the browser's `clarioItems` storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_recurrence")]
    pub recurring: Option<Recurrence>,
    pub status: Status,
    #[serde(default)]
    pub reminder: bool,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub recurring_processed: bool,
}

// Unknown or empty periods load as "not recurring" instead of failing the whole file.
fn lenient_recurrence<'de, D>(deserializer: D) -> Result<Option<Recurrence>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Recurrence::parse))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemRequest {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub amount: Option<FieldValue>,
    #[serde(default)]
    pub recurring: Option<String>,
    #[serde(default)]
    pub reminder: Option<FieldValue>,
    #[serde(default)]
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_amount(&self) -> f64 {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse().unwrap_or(0.0),
            Self::Bool(_) => 0.0,
        };
        if value.is_finite() && value >= 0.0 { value } else { 0.0 }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Number(value) => *value != 0.0,
            Self::Text(text) => matches!(text.trim(), "on" | "true" | "1" | "yes"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    pub after: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub due_date: NaiveDate,
    pub due_label: String,
    pub amount: Option<f64>,
    pub recurring: Option<Recurrence>,
    pub status: Status,
    pub reminder: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub mode: Mode,
    pub upcoming: Vec<ItemView>,
    pub items: Vec<ItemView>,
    pub monthly_total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub seq: u64,
    pub item_id: String,
    pub title: String,
    pub body: String,
    pub fired_at: DateTime<Utc>,
}
