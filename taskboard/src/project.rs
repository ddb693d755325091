//! User-defined groupings of tasks.

use crate::store::Record;
use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Colors a project can be given, in the order the project dialog offers them.
pub const PALETTE: [&str; 10] = [
    "#ef4444", // red
    "#f97316", // orange
    "#eab308", // yellow
    "#22c55e", // green
    "#06b6d4", // cyan
    "#3b82f6", // blue
    "#8b5cf6", // violet
    "#ec4899", // pink
    "#64748b", // slate
    "#6b7280", // gray
];

/// Color used when none is chosen, matching the storage default.
pub const DEFAULT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub color: String,
    pub user_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub(crate) fn create(input: ProjectInput, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            color: input.color.unwrap_or_else(default_color),
            user_id: user_id.to_string(),
            created_at: now,
        }
    }

    pub fn to_record(&self) -> Result<Record, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(record) => Ok(record),
            other => Err(serde::ser::Error::custom(format!(
                "project serialized to a non-object value: {other}"
            ))),
        }
    }

    pub fn from_record(record: Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(record))
    }
}

/// Fields submitted by the project dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl ProjectInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Trims the name and lower-cases the color so it can be matched against [`PALETTE`].
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            color: self
                .color
                .map(|color| color.trim().to_ascii_lowercase())
                .filter(|color| !color.is_empty()),
        }
    }

    /// Whether the chosen color, if any, belongs to the palette.
    pub fn has_palette_color(&self) -> bool {
        self.color
            .as_deref()
            .is_none_or(|color| PALETTE.contains(&color))
    }
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn color_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|color| !color.is_empty())
        .unwrap_or_else(default_color))
}
