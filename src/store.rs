use tracing::{debug, info};

use crate::error::StoreError;
use crate::storage::Storage;
use crate::task::Task;

pub const DEFAULT_KEY: &str = "tasks";

/// The whole task collection persisted as one JSON array under one key.
///
/// Every mutation is a full read-modify-write of that array.
#[derive(Debug)]
pub struct TaskStore<S> {
    storage: S,
    key: String,
}

impl<S: Storage> TaskStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub fn load_all(&self) -> Result<Vec<Task>, StoreError> {
        let Some(data) = self.storage.get(&self.key)? else {
            debug!("no stored tasks");
            return Ok(Vec::new());
        };
        let tasks: Vec<Task> =
            serde_json::from_str(&data).map_err(|source| StoreError::CorruptState {
                key: self.key.clone(),
                source,
            })?;
        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    #[tracing::instrument(skip(self, tasks), fields(key = %self.key, count = tasks.len()))]
    pub fn save_all(&mut self, tasks: &[Task]) -> Result<(), StoreError> {
        let data = serde_json::to_string(tasks).map_err(StoreError::Encode)?;
        self.storage.set(&self.key, &data)
    }

    #[tracing::instrument(skip(self, task), fields(id = task.id))]
    pub fn append(&mut self, task: Task) -> Result<(), StoreError> {
        let mut tasks = self.load_all()?;
        tasks.push(task);
        self.save_all(&tasks)?;
        info!(count = tasks.len(), "task added");
        Ok(())
    }

    pub fn find_by_id(&self, id: u64) -> Result<Option<Task>, StoreError> {
        Ok(self.load_all()?.into_iter().find(|t| t.id == id))
    }

    /// Applies `mutator` to the task with `id` and persists. Returns
    /// `false` without writing when no such task exists.
    #[tracing::instrument(skip(self, mutator))]
    pub fn update_by_id<F>(&mut self, id: u64, mutator: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.load_all()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            debug!("task not found, nothing to update");
            return Ok(false);
        };
        mutator(task);
        self.save_all(&tasks)?;
        Ok(true)
    }

    /// Returns whether a task was removed.
    #[tracing::instrument(skip(self))]
    pub fn remove_by_id(&mut self, id: u64) -> Result<bool, StoreError> {
        let tasks = self.load_all()?;
        let before = tasks.len();
        let kept: Vec<Task> = tasks.into_iter().filter(|t| t.id != id).collect();
        self.save_all(&kept)?;
        let removed = kept.len() < before;
        info!(removed, remaining = kept.len(), "task removal");
        Ok(removed)
    }

    /// Deletes the key itself, unlike `save_all(&[])`.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.storage.remove(&self.key)?;
        info!("all tasks cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::task::Category;
    use chrono::NaiveDate;

    fn task(id: u64, title: &str) -> Task {
        Task::new(
            id,
            title.to_string(),
            format!("about {title}"),
            Category::Work,
            NaiveDate::from_ymd_opt(2999, 6, 1).unwrap(),
        )
    }

    fn store() -> TaskStore<MemoryStorage> {
        TaskStore::new(MemoryStorage::new(), DEFAULT_KEY)
    }

    #[test]
    fn load_all_is_empty_when_key_absent() {
        assert!(store().load_all().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let mut store = store();
        let mut tasks = vec![task(3, "c"), task(1, "a"), task(2, "b")];
        tasks[1].is_completed = true;
        store.save_all(&tasks).unwrap();
        assert_eq!(store.load_all().unwrap(), tasks);
    }

    #[test]
    fn corrupt_blob_is_reported() {
        let mut storage = MemoryStorage::new();
        storage.set(DEFAULT_KEY, "{not json").unwrap();
        let store = TaskStore::new(storage, DEFAULT_KEY);
        assert!(matches!(
            store.load_all(),
            Err(StoreError::CorruptState { .. })
        ));
    }

    #[test]
    fn update_and_remove_missing_ids_are_noops() {
        let mut store = store();
        store.append(task(1, "a")).unwrap();

        assert!(!store.update_by_id(99, |t| t.is_completed = true).unwrap());
        assert!(!store.remove_by_id(99).unwrap());
        assert_eq!(store.load_all().unwrap(), vec![task(1, "a")]);
    }

    #[test]
    fn update_by_id_persists_mutation() {
        let mut store = store();
        store.append(task(1, "a")).unwrap();
        store.append(task(2, "b")).unwrap();

        assert!(store.update_by_id(2, |t| t.title = "renamed".into()).unwrap());
        assert_eq!(store.find_by_id(2).unwrap().unwrap().title, "renamed");
        assert_eq!(store.find_by_id(1).unwrap().unwrap().title, "a");
    }

    #[test]
    fn clear_removes_key_while_empty_save_keeps_it() {
        let mut store = store();
        store.save_all(&[]).unwrap();
        assert!(store.storage().contains_key(DEFAULT_KEY));

        store.append(task(1, "a")).unwrap();
        store.clear().unwrap();
        assert!(!store.storage().contains_key(DEFAULT_KEY));
        assert!(store.load_all().unwrap().is_empty());
    }
}
