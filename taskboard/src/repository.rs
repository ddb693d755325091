//! In-memory task and project collections mirrored to a [`DataStore`].
//!
//! The repository keeps the only local copy of the board. A local collection changes only
//! after the data store accepted the corresponding write, so a failed write leaves it exactly
//! as it was. Writes never hold a lock while waiting on the store: two operations on
//! different records interleave freely, and two on the same record resolve last-write-wins.

use crate::auth::{Identity, User};
use crate::project::{Project, ProjectInput};
use crate::store::{self, DataStore, EntityKind, OrderBy, Record};
use crate::task::{Task, TaskInput};
use crate::view::{TaskCounts, View, ViewModel, compute_counts};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors returned by repository mutations.
///
/// Whatever the variant, the local collections are unchanged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Task title is required")]
    EmptyTitle,
    #[error("Project name is required")]
    EmptyName,
    #[error("Color '{0}' is not in the project palette")]
    UnknownColor(String),
    #[error("No user is signed in")]
    Unauthenticated,
    #[error("Record could not be converted: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] store::Error),
}

/// Owner of the task and project collections.
pub struct Repository {
    store: Arc<dyn DataStore>,
    owner: Option<User>,
    tasks: RwLock<Vec<Task>>,
    projects: RwLock<Vec<Project>>,
}

impl Repository {
    /// Creates an empty repository. Nothing is loaded until [`Repository::load`] is called.
    pub fn new(store: Arc<dyn DataStore>, owner: Option<User>) -> Self {
        Self {
            store,
            owner,
            tasks: RwLock::new(Vec::new()),
            projects: RwLock::new(Vec::new()),
        }
    }

    /// Resolves the current user and loads both collections.
    ///
    /// If nobody is signed in the repository starts empty and every creation fails with
    /// [`Error::Unauthenticated`].
    #[tracing::instrument(skip_all)]
    pub async fn initialize(store: Arc<dyn DataStore>, identity: &dyn Identity) -> Self {
        match identity.me().await {
            Ok(user) => {
                let repository = Self::new(store, Some(user));
                repository.load().await;
                repository
            }
            Err(err) => {
                tracing::error!("Initialization error: {}", err);
                Self::new(store, None)
            }
        }
    }

    pub fn owner(&self) -> Option<&User> {
        self.owner.as_ref()
    }

    /// Loads tasks and projects concurrently.
    pub async fn load(&self) {
        tokio::join!(self.load_tasks(), self.load_projects());
    }

    /// Replaces the local tasks with the stored ones, newest first.
    ///
    /// A failed fetch empties the collection, creates the table if it is missing and fetches
    /// once more. A second failure is logged and the collection stays empty.
    #[tracing::instrument(skip(self))]
    pub async fn load_tasks(&self) {
        let kind = EntityKind::Tasks;
        let order = OrderBy::descending("created_at");
        let records = match self.store.list(kind, order).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!("Error loading tasks: {}", err);
                self.tasks.write().await.clear();
                self.bootstrap(kind, order).await
            }
        };
        let tasks = decode_all(records, Task::from_record, kind);
        tracing::info!("Loaded {} tasks", tasks.len());
        *self.tasks.write().await = tasks;
    }

    /// Replaces the local projects with the stored ones, oldest first.
    ///
    /// Failures are handled the same way as for [`Repository::load_tasks`].
    #[tracing::instrument(skip(self))]
    pub async fn load_projects(&self) {
        let kind = EntityKind::Projects;
        let order = OrderBy::ascending("created_at");
        let records = match self.store.list(kind, order).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!("Error loading projects: {}", err);
                self.projects.write().await.clear();
                self.bootstrap(kind, order).await
            }
        };
        let projects = decode_all(records, Project::from_record, kind);
        tracing::info!("Loaded {} projects", projects.len());
        *self.projects.write().await = projects;
    }

    /// Creates the table for `kind` if it is missing and lists it once more.
    async fn bootstrap(&self, kind: EntityKind, order: OrderBy) -> Vec<Record> {
        if let Err(err) = self.store.execute(kind.create_table_statement()).await {
            tracing::error!("Error creating {} table: {}", kind.table(), err);
            return Vec::new();
        }
        tracing::warn!("Created missing {} table, retrying", kind.table());
        self.store.list(kind, order).await.unwrap_or_else(|err| {
            tracing::error!("Error loading {} after creating table: {}", kind.table(), err);
            Vec::new()
        })
    }

    /// Snapshot of all tasks, newest first.
    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// Snapshot of all projects, oldest first.
    pub async fn projects(&self) -> Vec<Project> {
        self.projects.read().await.clone()
    }

    pub async fn task(&self, id: &str) -> Option<Task> {
        self.tasks.read().await.iter().find(|task| task.id == id).cloned()
    }

    /// Counts for the sidebar at `now`.
    pub async fn counts<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TaskCounts {
        let tasks = self.tasks.read().await;
        let projects = self.projects.read().await;
        compute_counts(&tasks, &projects, now)
    }

    /// Everything needed to render `view` at `now`.
    pub async fn view<Tz: TimeZone>(&self, view: &View, now: &DateTime<Tz>) -> ViewModel {
        let tasks = self.tasks.read().await;
        let projects = self.projects.read().await;
        ViewModel::build(&tasks, &projects, view, now)
    }

    fn owner_id(&self) -> Result<&str, Error> {
        self.owner
            .as_ref()
            .map(|user| user.id.as_str())
            .ok_or(Error::Unauthenticated)
    }

    /// Creates a task and puts it at the top of the list.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, input: TaskInput) -> Result<Task, Error> {
        let input = input.normalized();
        if input.title.is_empty() {
            tracing::debug!("Ignoring task without a title");
            return Err(Error::EmptyTitle);
        }
        let task = Task::create(input, self.owner_id()?, Utc::now());

        let stored = self
            .store
            .create(EntityKind::Tasks, task.to_record()?)
            .await
            .inspect_err(|err| tracing::error!("Error saving task: {}", err))?;
        // Already persisted; fall back to what was sent.
        let task = Task::from_record(stored).unwrap_or_else(|err| {
            tracing::warn!("Store echoed an unreadable task, keeping the sent one: {}", err);
            task
        });

        self.tasks.write().await.insert(0, task.clone());
        Ok(task)
    }

    /// Replaces the editable fields of the task with `id`.
    ///
    /// Returns `Ok(None)` without touching the store when no such task is loaded.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(&self, id: &str, patch: TaskInput) -> Result<Option<Task>, Error> {
        let patch = patch.normalized();
        if patch.title.is_empty() {
            tracing::debug!("Ignoring edit without a title");
            return Err(Error::EmptyTitle);
        }
        let Some(current) = self.task(id).await else {
            return Ok(None);
        };
        let edited = current.edited(patch, Utc::now());

        self.store
            .update(EntityKind::Tasks, id, edited.to_record()?)
            .await
            .inspect_err(|err| tracing::error!("Error saving task: {}", err))?;

        Ok(self.replace_task(edited).await)
    }

    /// Flips the completion state of the task with `id`.
    ///
    /// Returns `Ok(None)` without touching the store when no such task is loaded.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_task(&self, id: &str) -> Result<Option<Task>, Error> {
        let Some(current) = self.task(id).await else {
            return Ok(None);
        };
        let toggled = current.toggled();

        self.store
            .update(EntityKind::Tasks, id, toggled.to_record()?)
            .await
            .inspect_err(|err| tracing::error!("Error toggling task: {}", err))?;

        Ok(self.replace_task(toggled).await)
    }

    /// Deletes the task with `id`, returning whether a task was removed.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: &str) -> Result<bool, Error> {
        if self.task(id).await.is_none() {
            return Ok(false);
        }

        self.store
            .delete(EntityKind::Tasks, id)
            .await
            .inspect_err(|err| tracing::error!("Error deleting task: {}", err))?;

        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        Ok(tasks.len() != before)
    }

    /// Creates a project and appends it to the list.
    #[tracing::instrument(skip(self))]
    pub async fn create_project(&self, input: ProjectInput) -> Result<Project, Error> {
        let input = input.normalized();
        if input.name.is_empty() {
            tracing::debug!("Ignoring project without a name");
            return Err(Error::EmptyName);
        }
        if !input.has_palette_color() {
            return Err(Error::UnknownColor(input.color.unwrap_or_default()));
        }
        let project = Project::create(input, self.owner_id()?, Utc::now());

        let stored = self
            .store
            .create(EntityKind::Projects, project.to_record()?)
            .await
            .inspect_err(|err| tracing::error!("Error creating project: {}", err))?;
        let project = Project::from_record(stored).unwrap_or_else(|err| {
            tracing::warn!("Store echoed an unreadable project, keeping the sent one: {}", err);
            project
        });

        self.projects.write().await.push(project.clone());
        Ok(project)
    }

    /// Swaps in `task` for the loaded task with the same id.
    ///
    /// The task may have been deleted while the store call was in flight; it is not revived.
    async fn replace_task(&self, task: Task) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let slot = tasks.iter_mut().find(|existing| existing.id == task.id)?;
        *slot = task.clone();
        Some(task)
    }
}

/// Decodes stored records, skipping (and logging) any that cannot be read.
fn decode_all<T>(
    records: Vec<Record>,
    decode: impl Fn(Record) -> Result<T, serde_json::Error>,
    kind: EntityKind,
) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record
                .get("id")
                .map(ToString::to_string)
                .unwrap_or_default();
            decode(record)
                .inspect_err(|err| {
                    tracing::warn!("Skipping malformed {} record {}: {}", kind.table(), id, err)
                })
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MockIdentity;
    use crate::store::MockDataStore;
    use crate::task::INBOX;
    use mockall::predicate::*;
    use serde_json::json;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: "ada@example.com".to_string(),
            display_name: None,
        }
    }

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(record) => record,
            _ => panic!("test record must be an object"),
        }
    }

    fn stored_task(id: &str, completed: serde_json::Value) -> Record {
        record(json!({
            "id": id,
            "title": format!("Task {id}"),
            "description": null,
            "completed": completed,
            "priority": "medium",
            "due_date": null,
            "project_id": "inbox",
            "user_id": "user-1",
            "created_at": "2024-06-01T08:00:00.000Z",
            "updated_at": "2024-06-01T08:00:00.000Z"
        }))
    }

    fn stored_project(id: &str) -> Record {
        record(json!({
            "id": id,
            "name": format!("Project {id}"),
            "color": "#3b82f6",
            "user_id": "user-1",
            "created_at": "2024-06-01T08:00:00.000Z"
        }))
    }

    fn unavailable() -> store::Error {
        store::Error::Unavailable("connection refused".to_string())
    }

    /// Builds a repository whose tasks are already loaded from `records`.
    async fn loaded(mut store: MockDataStore, records: Vec<Record>) -> Repository {
        store
            .expect_list()
            .with(eq(EntityKind::Tasks), always())
            .times(1)
            .returning(move |_, _| Ok(records.clone()));
        let repository = Repository::new(Arc::new(store), Some(user()));
        repository.load_tasks().await;
        repository
    }

    mod load_tests {
        use super::*;

        #[tokio::test]
        async fn loads_tasks_newest_first_and_projects_oldest_first() {
            let mut store = MockDataStore::new();
            store
                .expect_list()
                .with(eq(EntityKind::Tasks), eq(OrderBy::descending("created_at")))
                .times(1)
                .returning(|_, _| Ok(vec![stored_task("2", json!(0)), stored_task("1", json!(1))]));
            store
                .expect_list()
                .with(eq(EntityKind::Projects), eq(OrderBy::ascending("created_at")))
                .times(1)
                .returning(|_, _| Ok(vec![stored_project("p1")]));
            let mut identity = MockIdentity::new();
            identity.expect_me().times(1).returning(|| Ok(user()));

            let repository = Repository::initialize(Arc::new(store), &identity).await;

            let ids: Vec<String> = repository.tasks().await.into_iter().map(|task| task.id).collect();
            assert_eq!(ids, vec!["2", "1"]);
            assert_eq!(repository.projects().await.len(), 1);
            assert_eq!(repository.owner(), Some(&user()));
        }

        #[tokio::test]
        async fn failed_fetch_creates_table_and_retries_once() {
            let mut store = MockDataStore::new();
            let mut sequence = mockall::Sequence::new();
            store
                .expect_list()
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|_, _| Err(unavailable()));
            store
                .expect_execute()
                .withf(|statement| statement.starts_with("CREATE TABLE IF NOT EXISTS tasks"))
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|_| Ok(()));
            store
                .expect_list()
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|_, _| Ok(vec![stored_task("1", json!(false))]));
            let repository = Repository::new(Arc::new(store), Some(user()));

            repository.load_tasks().await;

            assert_eq!(repository.tasks().await.len(), 1);
        }

        #[tokio::test]
        async fn second_failure_leaves_collection_empty() {
            let mut store = MockDataStore::new();
            store
                .expect_list()
                .times(2)
                .returning(|_, _| Err(unavailable()));
            store.expect_execute().times(1).returning(|_| Ok(()));
            let repository = Repository::new(Arc::new(store), Some(user()));

            repository.load_tasks().await;

            assert!(repository.tasks().await.is_empty());
        }

        #[tokio::test]
        async fn failed_table_creation_skips_retry() {
            let mut store = MockDataStore::new();
            store
                .expect_list()
                .times(1)
                .returning(|_, _| Err(unavailable()));
            store
                .expect_execute()
                .withf(|statement| statement.starts_with("CREATE TABLE IF NOT EXISTS projects"))
                .times(1)
                .returning(|_| Err(unavailable()));
            let repository = Repository::new(Arc::new(store), Some(user()));

            repository.load_projects().await;

            assert!(repository.projects().await.is_empty());
        }

        #[tokio::test]
        async fn failed_reload_clears_previously_loaded_tasks() {
            let mut store = MockDataStore::new();
            let mut sequence = mockall::Sequence::new();
            store
                .expect_list()
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|_, _| Ok(vec![stored_task("1", json!(0))]));
            store
                .expect_list()
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|_, _| Err(unavailable()));
            store
                .expect_execute()
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|_| Err(unavailable()));
            let repository = Repository::new(Arc::new(store), Some(user()));
            repository.load_tasks().await;
            assert_eq!(repository.tasks().await.len(), 1);

            repository.load_tasks().await;

            assert!(repository.tasks().await.is_empty());
        }

        #[tokio::test]
        async fn skips_malformed_records() {
            let mut broken = stored_task("2", json!(0));
            broken.remove("title");
            let repository = loaded(
                MockDataStore::new(),
                vec![stored_task("1", json!("1")), broken, stored_task("3", json!(0))],
            )
            .await;

            let tasks = repository.tasks().await;

            assert_eq!(tasks.len(), 2);
            assert!(tasks[0].completed);
            assert!(!tasks[1].completed);
        }

        #[tokio::test]
        async fn unauthenticated_start_is_empty_and_cannot_create() {
            let store = MockDataStore::new();
            let mut identity = MockIdentity::new();
            identity
                .expect_me()
                .times(1)
                .returning(|| Err(crate::auth::Error::Unauthenticated));

            let repository = Repository::initialize(Arc::new(store), &identity).await;

            assert!(repository.tasks().await.is_empty());
            assert!(repository.projects().await.is_empty());
            let result = repository.create_task(TaskInput::new("Buy milk")).await;
            assert!(matches!(result, Err(Error::Unauthenticated)));
        }
    }

    mod create_task_tests {
        use super::*;

        #[tokio::test]
        async fn prepends_created_task() {
            let mut store = MockDataStore::new();
            store
                .expect_create()
                .withf(|kind, record| {
                    *kind == EntityKind::Tasks
                        && record["title"] == json!("Buy milk")
                        && record["completed"] == json!(false)
                        && record["project_id"] == json!(INBOX)
                        && record["user_id"] == json!("user-1")
                })
                .times(1)
                .returning(|_, record| Ok(record));
            let repository = loaded(store, vec![stored_task("1", json!(0))]).await;

            let task = repository
                .create_task(TaskInput::new("  Buy milk ").description("2 liters"))
                .await
                .expect("task should be created");

            let tasks = repository.tasks().await;
            assert_eq!(tasks.len(), 2);
            assert_eq!(tasks[0], task);
            assert_eq!(task.description.as_deref(), Some("2 liters"));
            assert_eq!(task.created_at, task.updated_at);
        }

        #[tokio::test]
        async fn rejects_blank_title_without_calling_store() {
            let repository = loaded(MockDataStore::new(), vec![]).await;

            let result = repository.create_task(TaskInput::new("   ")).await;

            assert!(matches!(result, Err(Error::EmptyTitle)));
            assert!(repository.tasks().await.is_empty());
        }

        #[tokio::test]
        async fn failed_create_leaves_tasks_untouched() {
            let mut store = MockDataStore::new();
            store
                .expect_create()
                .times(1)
                .returning(|_, _| Err(unavailable()));
            let repository = loaded(store, vec![stored_task("1", json!(0))]).await;
            let before = repository.tasks().await;

            let result = repository.create_task(TaskInput::new("Buy milk")).await;

            assert!(matches!(result, Err(Error::Store(_))));
            assert_eq!(repository.tasks().await, before);
        }
    }

    mod update_task_tests {
        use super::*;

        #[tokio::test]
        async fn replaces_fields_and_refreshes_updated_at() {
            let mut store = MockDataStore::new();
            store
                .expect_update()
                .withf(|kind, id, patch| {
                    *kind == EntityKind::Tasks
                        && id == "1"
                        && patch["title"] == json!("Renamed")
                        && patch["priority"] == json!("urgent")
                })
                .times(1)
                .returning(|_, _, _| Ok(()));
            let repository = loaded(store, vec![stored_task("1", json!(1))]).await;
            let before = repository.task("1").await.unwrap();

            let updated = repository
                .update_task(
                    "1",
                    TaskInput::new("Renamed").priority(crate::task::Priority::Urgent),
                )
                .await
                .expect("update should succeed")
                .expect("task should exist");

            assert_eq!(updated.title, "Renamed");
            assert!(updated.completed, "completion is kept when not part of the patch");
            assert!(updated.updated_at > before.updated_at);
            assert_eq!(updated.created_at, before.created_at);
            assert_eq!(repository.task("1").await, Some(updated));
        }

        #[tokio::test]
        async fn failed_update_leaves_task_untouched() {
            let mut store = MockDataStore::new();
            store
                .expect_update()
                .times(1)
                .returning(|_, _, _| Err(unavailable()));
            let repository = loaded(store, vec![stored_task("1", json!(0))]).await;
            let before = repository.tasks().await;

            let result = repository.update_task("1", TaskInput::new("Renamed")).await;

            assert!(matches!(result, Err(Error::Store(_))));
            assert_eq!(repository.tasks().await, before);
        }

        #[tokio::test]
        async fn unknown_task_is_a_no_op() {
            let repository = loaded(MockDataStore::new(), vec![stored_task("1", json!(0))]).await;

            let result = repository.update_task("missing", TaskInput::new("Renamed")).await;

            assert!(matches!(result, Ok(None)));
        }
    }

    mod toggle_task_tests {
        use super::*;

        #[tokio::test]
        async fn persists_full_record_with_flipped_flag() {
            let mut store = MockDataStore::new();
            store
                .expect_update()
                .withf(|_, id, patch| {
                    id == "1" && patch["completed"] == json!(true) && patch["title"] == json!("Task 1")
                })
                .times(1)
                .returning(|_, _, _| Ok(()));
            let repository = loaded(store, vec![stored_task("1", json!(0))]).await;

            let toggled = repository.toggle_task("1").await.unwrap().unwrap();

            assert!(toggled.completed);
            assert_eq!(repository.task("1").await, Some(toggled));
        }

        #[tokio::test]
        async fn toggling_twice_restores_original_state() {
            let mut store = MockDataStore::new();
            store.expect_update().times(2).returning(|_, _, _| Ok(()));
            let repository = loaded(store, vec![stored_task("1", json!("0"))]).await;
            let original = repository.task("1").await.unwrap();

            repository.toggle_task("1").await.unwrap();
            repository.toggle_task("1").await.unwrap();

            assert_eq!(repository.task("1").await, Some(original));
        }

        #[tokio::test]
        async fn failed_toggle_leaves_task_untouched() {
            let mut store = MockDataStore::new();
            store
                .expect_update()
                .times(1)
                .returning(|_, _, _| Err(unavailable()));
            let repository = loaded(store, vec![stored_task("1", json!(0))]).await;

            let result = repository.toggle_task("1").await;

            assert!(result.is_err());
            assert!(!repository.task("1").await.unwrap().completed);
        }

        #[tokio::test]
        async fn unknown_task_is_a_no_op() {
            let repository = loaded(MockDataStore::new(), vec![]).await;

            assert!(matches!(repository.toggle_task("missing").await, Ok(None)));
        }
    }

    mod delete_task_tests {
        use super::*;

        #[tokio::test]
        async fn removes_deleted_task() {
            let mut store = MockDataStore::new();
            store
                .expect_delete()
                .with(eq(EntityKind::Tasks), eq("1"))
                .times(1)
                .returning(|_, _| Ok(()));
            let repository =
                loaded(store, vec![stored_task("2", json!(0)), stored_task("1", json!(0))]).await;

            assert!(repository.delete_task("1").await.unwrap());

            let ids: Vec<String> = repository.tasks().await.into_iter().map(|task| task.id).collect();
            assert_eq!(ids, vec!["2"]);
        }

        #[tokio::test]
        async fn failed_delete_keeps_task() {
            let mut store = MockDataStore::new();
            store
                .expect_delete()
                .times(1)
                .returning(|_, _| Err(unavailable()));
            let repository = loaded(store, vec![stored_task("1", json!(0))]).await;

            assert!(repository.delete_task("1").await.is_err());
            assert_eq!(repository.tasks().await.len(), 1);
        }

        #[tokio::test]
        async fn unknown_task_is_a_no_op() {
            let repository = loaded(MockDataStore::new(), vec![]).await;

            assert!(!repository.delete_task("missing").await.unwrap());
        }
    }

    mod create_project_tests {
        use super::*;

        #[tokio::test]
        async fn appends_created_project() {
            let mut store = MockDataStore::new();
            store
                .expect_create()
                .withf(|kind, record| {
                    *kind == EntityKind::Projects
                        && record["name"] == json!("Work")
                        && record["color"] == json!("#ec4899")
                })
                .times(1)
                .returning(|_, record| Ok(record));
            let repository = Repository::new(Arc::new(store), Some(user()));

            let project = repository
                .create_project(ProjectInput::new(" Work ").color("#EC4899"))
                .await
                .expect("project should be created");

            assert_eq!(repository.projects().await, vec![project.clone()]);
            assert_eq!(project.user_id, "user-1");
        }

        #[tokio::test]
        async fn rejects_blank_name_and_unknown_color() {
            let repository = Repository::new(Arc::new(MockDataStore::new()), Some(user()));

            let blank = repository.create_project(ProjectInput::new("  ")).await;
            let off_palette = repository
                .create_project(ProjectInput::new("Work").color("#000000"))
                .await;

            assert!(matches!(blank, Err(Error::EmptyName)));
            assert!(matches!(off_palette, Err(Error::UnknownColor(color)) if color == "#000000"));
            assert!(repository.projects().await.is_empty());
        }

        #[tokio::test]
        async fn failed_create_leaves_projects_untouched() {
            let mut store = MockDataStore::new();
            store
                .expect_create()
                .times(1)
                .returning(|_, _| Err(unavailable()));
            let repository = Repository::new(Arc::new(store), Some(user()));

            assert!(repository.create_project(ProjectInput::new("Work")).await.is_err());
            assert!(repository.projects().await.is_empty());
        }
    }

    #[tokio::test]
    async fn counts_follow_successful_mutations() {
        let mut store = MockDataStore::new();
        store.expect_update().times(1).returning(|_, _, _| Ok(()));
        let repository = loaded(store, vec![stored_task("1", json!(0))]).await;
        let now = Utc::now();
        assert_eq!(repository.counts(&now).await.get("inbox"), 1);

        repository.toggle_task("1").await.unwrap();

        let counts = repository.counts(&now).await;
        assert_eq!(counts.get("inbox"), 0);
        assert_eq!(counts.get("completed"), 1);
        let model = repository.view(&View::Completed, &now).await;
        assert_eq!(model.tasks.len(), 1);
    }
}
