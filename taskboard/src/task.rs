//! Tasks and the record conversions applied at the data store boundary.
//!
//! Stores disagree about how a boolean comes back: SQLite hands out `0`/`1`, Postgres a
//! real boolean, and rows written by other clients may even carry `"1"` or `"true"`. The
//! [`completed_flag`] module is the single place where those shapes are folded into a
//! `bool`, both when records are loaded and when they are written back.

use crate::store::Record;
use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Project id of tasks that are not assigned to a user-created project.
pub const INBOX: &str = "inbox";

/// How urgent a task is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

/// A single actionable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "completed_flag", default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "priority_or_default")]
    pub priority: Priority,
    #[serde(default, with = "timestamp::optional")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default = "inbox", deserialize_with = "project_id_or_inbox")]
    pub project_id: String,
    pub user_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The completion state as the `0`/`1` flag every view predicate compares against.
    pub fn completed_flag(&self) -> u8 {
        u8::from(self.completed)
    }

    /// Builds a new task owned by `user_id` from already normalized input.
    pub(crate) fn create(input: TaskInput, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            completed: input.completed.unwrap_or(false),
            priority: input.priority,
            due_date: input.due_date,
            project_id: input.project_id.unwrap_or_else(inbox),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with the editable fields replaced by `patch` and `updated_at` set to `now`.
    ///
    /// A patch without a completion state keeps the current one.
    pub(crate) fn edited(&self, patch: TaskInput, now: DateTime<Utc>) -> Self {
        Self {
            title: patch.title,
            description: patch.description,
            completed: patch.completed.unwrap_or(self.completed),
            priority: patch.priority,
            due_date: patch.due_date,
            project_id: patch.project_id.unwrap_or_else(inbox),
            updated_at: now,
            ..self.clone()
        }
    }

    /// Returns a copy with the completion state flipped.
    pub(crate) fn toggled(&self) -> Self {
        Self {
            completed: self.completed_flag() == 0,
            ..self.clone()
        }
    }

    /// Converts the task into the record shape written to the data store.
    pub fn to_record(&self) -> Result<Record, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(record) => Ok(record),
            other => Err(serde::ser::Error::custom(format!(
                "task serialized to a non-object value: {other}"
            ))),
        }
    }

    /// Reads a task from a record returned by the data store.
    pub fn from_record(record: Record) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(record))
    }
}

/// The user-editable fields of a task, as submitted by the task dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "timestamp::optional")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Trims text fields, drops a blank description and sends a blank project to the inbox.
    pub fn normalized(self) -> Self {
        let description = self
            .description
            .map(|description| description.trim().to_string())
            .filter(|description| !description.is_empty());
        let project_id = self
            .project_id
            .map(|project_id| project_id.trim().to_string())
            .filter(|project_id| !project_id.is_empty())
            .or_else(|| Some(inbox()));
        Self {
            title: self.title.trim().to_string(),
            description,
            project_id,
            ..self
        }
    }
}

fn inbox() -> String {
    INBOX.to_string()
}

fn project_id_or_inbox<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|project_id| !project_id.is_empty())
        .unwrap_or_else(inbox))
}

fn priority_or_default<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Priority>::deserialize(deserializer)?.unwrap_or_default())
}

/// Boundary conversion for the completion flag.
///
/// Loading accepts booleans, the numbers `0`/`1` (any non-zero number counts as completed),
/// and strings holding either form. Writing always emits a boolean.
pub mod completed_flag {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// Interprets a stored value as a completion state, or `None` if it is not one.
    pub fn from_value(value: &Value) -> Option<bool> {
        match value {
            Value::Null => Some(false),
            Value::Bool(completed) => Some(*completed),
            Value::Number(number) => number.as_f64().map(|number| number != 0.0),
            Value::String(raw) => from_str(raw),
            _ => None,
        }
    }

    fn from_str(raw: &str) -> Option<bool> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            return Some(true);
        }
        if raw.eq_ignore_ascii_case("false") || raw.is_empty() {
            return Some(false);
        }
        raw.parse::<f64>().ok().map(|number| number != 0.0)
    }

    pub fn serialize<S>(completed: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(*completed)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        from_value(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("cannot read completion flag from {value}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(record) => record,
            _ => panic!("test record must be an object"),
        }
    }

    fn stored_task(completed: serde_json::Value) -> Record {
        record(json!({
            "id": "1",
            "title": "Write report",
            "description": null,
            "completed": completed,
            "priority": "high",
            "due_date": "2024-06-15T09:00:00.000Z",
            "project_id": "inbox",
            "user_id": "user-1",
            "created_at": "2024-06-01T08:00:00.000Z",
            "updated_at": "2024-06-01T08:00:00.000Z"
        }))
    }

    mod completed_flag_tests {
        use super::*;

        #[test]
        fn reads_boolean_number_and_text_flags() {
            for (stored, expected) in [
                (json!(true), true),
                (json!(false), false),
                (json!(1), true),
                (json!(0), false),
                (json!("1"), true),
                (json!("0"), false),
                (json!("true"), true),
                (json!("FALSE"), false),
                (json!(null), false),
            ] {
                let task = Task::from_record(stored_task(stored.clone())).unwrap();
                assert_eq!(task.completed, expected, "stored flag {stored}");
            }
        }

        #[test]
        fn rejects_unreadable_flag() {
            assert!(Task::from_record(stored_task(json!("maybe"))).is_err());
            assert!(Task::from_record(stored_task(json!([1]))).is_err());
        }

        #[test]
        fn writes_flag_as_boolean() {
            let task = Task::from_record(stored_task(json!(1))).unwrap();
            let written = task.to_record().unwrap();
            assert_eq!(written["completed"], json!(true));
        }

        #[test]
        fn exposes_numeric_flag() {
            let mut task = Task::from_record(stored_task(json!(0))).unwrap();
            assert_eq!(task.completed_flag(), 0);
            task.completed = true;
            assert_eq!(task.completed_flag(), 1);
        }
    }

    #[test]
    fn reads_stored_record() {
        let task = Task::from_record(stored_task(json!(0))).unwrap();

        assert_eq!(task.id, "1");
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, None);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(
            task.due_date,
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap())
        );
        assert_eq!(task.project_id, INBOX);
        assert_eq!(task.user_id, "user-1");
    }

    #[test]
    fn missing_or_null_project_falls_back_to_inbox() {
        let mut stored = stored_task(json!(0));
        stored.insert("project_id".to_string(), json!(null));
        assert_eq!(Task::from_record(stored.clone()).unwrap().project_id, INBOX);

        stored.remove("project_id");
        assert_eq!(Task::from_record(stored).unwrap().project_id, INBOX);
    }

    #[test]
    fn null_priority_falls_back_to_medium() {
        let mut stored = stored_task(json!(0));
        stored.insert("priority".to_string(), json!(null));
        assert_eq!(Task::from_record(stored).unwrap().priority, Priority::Medium);
    }

    #[test]
    fn empty_due_date_reads_as_unset() {
        let mut stored = stored_task(json!(0));
        stored.insert("due_date".to_string(), json!(""));
        assert_eq!(Task::from_record(stored).unwrap().due_date, None);
    }

    #[test]
    fn normalizes_input() {
        let input = TaskInput::new("  Buy milk  ")
            .description("   ")
            .project_id(" ")
            .normalized();

        assert_eq!(input.title, "Buy milk");
        assert_eq!(input.description, None);
        assert_eq!(input.project_id.as_deref(), Some(INBOX));
    }

    #[test]
    fn create_assigns_identity_and_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let task = Task::create(TaskInput::new("Buy milk").normalized(), "user-1", now);

        assert!(!task.id.is_empty());
        assert_eq!(task.user_id, "user-1");
        assert_eq!(task.project_id, INBOX);
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
    }

    #[test]
    fn edit_keeps_identity_and_completion_when_not_given() {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let edited_at = Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap();
        let task = Task {
            completed: true,
            ..Task::create(TaskInput::new("Old"), "user-1", created)
        };

        let edited = task.edited(TaskInput::new("New").project_id("work").normalized(), edited_at);

        assert_eq!(edited.id, task.id);
        assert_eq!(edited.user_id, task.user_id);
        assert_eq!(edited.created_at, created);
        assert_eq!(edited.updated_at, edited_at);
        assert_eq!(edited.title, "New");
        assert_eq!(edited.project_id, "work");
        assert!(edited.completed);
    }

    #[test]
    fn toggling_twice_restores_state() {
        let task = Task::create(TaskInput::new("Flip"), "user-1", Utc::now());
        assert!(task.toggled().completed);
        assert_eq!(task.toggled().toggled(), task);
    }
}
