use tracing::debug;

use crate::error::StoreError;
use crate::render::{ClickTarget, Control};
use crate::storage::Storage;
use crate::store::TaskStore;

/// Source of yes/no answers for destructive or replacing actions.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Answers every prompt with the same value.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysConfirm(pub bool);

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Complete(u64),
    Edit(u64),
    Delete(u64),
}

impl Action {
    /// Prompt the user must accept before the action runs.
    pub fn confirmation(self) -> Option<&'static str> {
        match self {
            Action::Complete(_) => None,
            Action::Edit(_) => Some("Are you sure you want to edit this task?"),
            Action::Delete(_) => Some("Are you sure you want to remove this task?"),
        }
    }
}

/// Turns a click inside the list into an action on a known task.
///
/// Returns `None` when the click missed every row, names a task that is
/// no longer stored, or landed outside the three controls.
pub fn resolve<S: Storage>(
    store: &TaskStore<S>,
    target: ClickTarget,
) -> Result<Option<Action>, StoreError> {
    let Some(id) = target.task_id else {
        return Ok(None);
    };
    if store.find_by_id(id)?.is_none() {
        debug!(id, "click on stale row ignored");
        return Ok(None);
    }
    let action = target.control.map(|control| match control {
        Control::Complete => Action::Complete(id),
        Control::Edit => Action::Edit(id),
        Control::Delete => Action::Delete(id),
    });
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::DEFAULT_KEY;
    use crate::task::{Category, Task};
    use chrono::NaiveDate;

    fn store_with(id: u64) -> TaskStore<MemoryStorage> {
        let mut store = TaskStore::new(MemoryStorage::new(), DEFAULT_KEY);
        let due = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap();
        store
            .append(Task::new(id, "t".into(), String::new(), Category::Other, due))
            .unwrap();
        store
    }

    fn click(task_id: Option<u64>, control: Option<Control>) -> ClickTarget {
        ClickTarget { task_id, control }
    }

    #[test]
    fn resolves_each_control() {
        let store = store_with(5);
        assert_eq!(
            resolve(&store, click(Some(5), Some(Control::Complete))).unwrap(),
            Some(Action::Complete(5))
        );
        assert_eq!(
            resolve(&store, click(Some(5), Some(Control::Edit))).unwrap(),
            Some(Action::Edit(5))
        );
        assert_eq!(
            resolve(&store, click(Some(5), Some(Control::Delete))).unwrap(),
            Some(Action::Delete(5))
        );
    }

    #[test]
    fn ignores_missing_row_stale_id_and_bare_row() {
        let store = store_with(5);
        assert_eq!(resolve(&store, click(None, Some(Control::Delete))).unwrap(), None);
        assert_eq!(resolve(&store, click(Some(6), Some(Control::Delete))).unwrap(), None);
        assert_eq!(resolve(&store, click(Some(5), None)).unwrap(), None);
    }

    #[test]
    fn only_destructive_actions_ask_first() {
        assert_eq!(Action::Complete(1).confirmation(), None);
        assert!(Action::Edit(1).confirmation().is_some());
        assert!(Action::Delete(1).confirmation().is_some());
    }
}
