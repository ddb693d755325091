//! Filtered task lists and the counts shown next to them.
//!
//! Everything here is a pure function of the task and project collections and the current
//! time. Dates are compared in the time zone of `now`, which lets callers pick local time
//! (the server clock) or any fixed zone (tests).
//!
//! `Today` and `Upcoming` overlap: a task due later today is both due today and after the
//! start of today, so it is listed (and counted) under both.

use crate::project::Project;
use crate::task::{INBOX, Task};
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One of the reserved task lists, or the list of a single project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum View {
    Inbox,
    Today,
    Upcoming,
    Completed,
    Project(String),
}

impl View {
    /// The reserved views, in sidebar order.
    pub const RESERVED: [View; 4] = [View::Inbox, View::Today, View::Upcoming, View::Completed];

    /// Identifier used for this view in counts and routes.
    pub fn id(&self) -> &str {
        match self {
            View::Inbox => "inbox",
            View::Today => "today",
            View::Upcoming => "upcoming",
            View::Completed => "completed",
            View::Project(id) => id,
        }
    }

    /// Heading shown above the list.
    ///
    /// A project view takes the project's name, or "Tasks" if the project is unknown.
    pub fn title(&self, projects: &[Project]) -> String {
        match self {
            View::Inbox => "Inbox".to_string(),
            View::Today => "Today".to_string(),
            View::Upcoming => "Upcoming".to_string(),
            View::Completed => "Completed".to_string(),
            View::Project(id) => projects
                .iter()
                .find(|project| &project.id == id)
                .map(|project| project.name.clone())
                .unwrap_or_else(|| "Tasks".to_string()),
        }
    }

    pub fn description(&self) -> Option<&'static str> {
        match self {
            View::Today => Some("Focus on today's priorities"),
            _ => None,
        }
    }

    /// Whether `task` belongs in this view at `now`.
    pub fn includes<Tz: TimeZone>(&self, task: &Task, now: &DateTime<Tz>) -> bool {
        match self {
            View::Completed => task.completed_flag() == 1,
            _ if task.completed_flag() != 0 => false,
            View::Inbox => task.project_id == INBOX,
            View::Today => due_in_zone(task, now)
                .is_some_and(|due| due.date() == now.date_naive()),
            View::Upcoming => {
                due_in_zone(task, now).is_some_and(|due| due > start_of_day(now))
            }
            View::Project(id) => &task.project_id == id,
        }
    }
}

impl From<&str> for View {
    fn from(id: &str) -> Self {
        match id {
            "inbox" => View::Inbox,
            "today" => View::Today,
            "upcoming" => View::Upcoming,
            "completed" => View::Completed,
            project => View::Project(project.to_string()),
        }
    }
}

impl From<String> for View {
    fn from(id: String) -> Self {
        View::from(id.as_str())
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The due date as a wall-clock time in the zone of `now`.
fn due_in_zone<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> Option<NaiveDateTime> {
    task.due_date
        .map(|due| due.with_timezone(&now.timezone()).naive_local())
}

fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDateTime {
    now.date_naive().and_time(NaiveTime::MIN)
}

/// Tasks that belong in `view` at `now`, in their original order.
pub fn select_view<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    view: &View,
    now: &DateTime<Tz>,
) -> Vec<&'a Task> {
    tasks.iter().filter(|task| view.includes(task, now)).collect()
}

/// Number of tasks per view or project id.
///
/// The reserved views are always present; a project without open tasks reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskCounts(BTreeMap<String, usize>);

impl TaskCounts {
    /// Count for a view or project id, zero when absent.
    pub fn get(&self, id: &str) -> usize {
        self.0.get(id).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(id, count)| (id.as_str(), *count))
    }
}

/// Counts the tasks in every reserved view and the open tasks of every project.
pub fn compute_counts<Tz: TimeZone>(
    tasks: &[Task],
    projects: &[Project],
    now: &DateTime<Tz>,
) -> TaskCounts {
    let mut counts: BTreeMap<String, usize> = View::RESERVED
        .iter()
        .map(|view| (view.id().to_string(), select_view(tasks, view, now).len()))
        .collect();

    for project in projects {
        let view = View::Project(project.id.clone());
        counts.insert(project.id.clone(), select_view(tasks, &view, now).len());
    }

    TaskCounts(counts)
}

/// How pressing a due date is, relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Overdue,
    Today,
    Later,
}

/// Short rendering of a task's due date for list items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueSummary {
    /// "Today", "Tomorrow", or a short date such as "Jun 20".
    pub label: String,
    pub status: DueStatus,
}

/// Summarizes the due date of `task`, if it has one.
pub fn describe_due<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> Option<DueSummary> {
    let due = task.due_date?.with_timezone(&now.timezone());
    let due_day = due.date_naive();
    let today = now.date_naive();

    let label = if due_day == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(due_day) {
        "Tomorrow".to_string()
    } else {
        due.naive_local().format("%b %-d").to_string()
    };
    let status = if due_day == today {
        DueStatus::Today
    } else if due.naive_local() < now.naive_local() {
        DueStatus::Overdue
    } else {
        DueStatus::Later
    };

    Some(DueSummary { label, status })
}

/// Everything the task list and sidebar need to render one view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub view: String,
    pub title: String,
    pub description: Option<&'static str>,
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub task_counts: TaskCounts,
}

impl ViewModel {
    pub fn build<Tz: TimeZone>(
        tasks: &[Task],
        projects: &[Project],
        view: &View,
        now: &DateTime<Tz>,
    ) -> Self {
        Self {
            view: view.id().to_string(),
            title: view.title(projects),
            description: view.description(),
            tasks: select_view(tasks, view, now).into_iter().cloned().collect(),
            projects: projects.to_vec(),
            task_counts: compute_counts(tasks, projects, now),
        }
    }
}
