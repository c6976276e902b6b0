//! The task tracker core: store, renderer, and the controllers driving
//! them. Input surfaces (terminal UI, command line) only translate their
//! events into calls on [`Tracker`].

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dispatch::{self, Action, Confirm};
use crate::error::{StoreError, TrackerError};
use crate::form::{self, FormState};
use crate::render::{ClickTarget, Renderer, TaskRow};
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::Task;

pub const MAX_ID: u64 = 9_999_999_999;

pub const CLEAR_PROMPT: &str = "Are you sure you want to delete all tasks?";

/// How confirming the edit prompt treats the original record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditMode {
    /// Keep the record until the form is resubmitted, then update it.
    #[default]
    InPlace,
    /// Remove the record immediately; resubmitting creates a new one.
    Replace,
}

pub struct Tracker<S> {
    store: TaskStore<S>,
    renderer: Renderer,
    edit_mode: EditMode,
    rng: StdRng,
    notice: Option<String>,
}

impl<S: Storage> Tracker<S> {
    pub fn new(store: TaskStore<S>, edit_mode: EditMode) -> Self {
        Self::with_rng(store, edit_mode, StdRng::from_entropy())
    }

    pub fn with_rng(store: TaskStore<S>, edit_mode: EditMode, rng: StdRng) -> Self {
        Self {
            store,
            renderer: Renderer::new(),
            edit_mode,
            rng,
            notice: None,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Warning raised by the last redraw, if the stored blob was unreadable.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Reloads the collection and rebuilds the visual list. An unreadable
    /// blob renders as an empty list and leaves a notice behind.
    pub fn render_all(&mut self) -> &[TaskRow] {
        let tasks = match self.store.load_all() {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "falling back to an empty list");
                self.notice = Some(format!("Stored tasks could not be read: {err}"));
                Vec::new()
            }
        };
        self.renderer.redraw(&tasks);
        self.renderer.rows()
    }

    fn generate_id(&mut self, existing: &[Task]) -> u64 {
        loop {
            let id = self.rng.gen_range(1..=MAX_ID);
            if !existing.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }

    /// Validates the form and stores the result, either as a new task or
    /// as the replacement for the task being edited in place.
    #[tracing::instrument(skip(self, form), fields(editing = ?form.editing))]
    pub fn submit_new_task(
        &mut self,
        form: &mut FormState,
        today: NaiveDate,
    ) -> Result<Task, TrackerError> {
        let valid = form::validate(&form.values(), today)?;

        let mut updated = None;
        if let Some(id) = form.editing {
            let edit = valid.clone();
            self.store.update_by_id(id, |task| {
                edit.apply_to(task);
                updated = Some(task.clone());
            })?;
            if updated.is_none() {
                debug!(id, "edited task no longer stored, adding as new");
            }
        }

        let task = match updated {
            Some(task) => task,
            None => {
                let existing = self.store.load_all()?;
                let id = self.generate_id(&existing);
                let task = valid.into_task(id);
                self.store.append(task.clone())?;
                task
            }
        };

        info!(id = task.id, title = %task.title, "task submitted");
        self.render_all();
        form.reset_after_submit();
        Ok(task)
    }

    /// Flips `isCompleted`. Returns `false` if the task is gone.
    #[tracing::instrument(skip(self))]
    pub fn toggle_complete(&mut self, id: u64) -> Result<bool, StoreError> {
        let found = self
            .store
            .update_by_id(id, |task| task.is_completed = !task.is_completed)?;
        self.render_all();
        Ok(found)
    }

    pub fn begin_edit(
        &mut self,
        id: u64,
        form: &mut FormState,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, StoreError> {
        self.ask_then_perform(Action::Edit(id), form, confirm)
    }

    pub fn delete_task(
        &mut self,
        id: u64,
        form: &mut FormState,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, StoreError> {
        self.ask_then_perform(Action::Delete(id), form, confirm)
    }

    /// Resolves a click on the list and runs the matching action.
    pub fn on_list_click(
        &mut self,
        target: ClickTarget,
        form: &mut FormState,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, StoreError> {
        match dispatch::resolve(&self.store, target)? {
            Some(action) => self.ask_then_perform(action, form, confirm),
            None => Ok(false),
        }
    }

    fn ask_then_perform(
        &mut self,
        action: Action,
        form: &mut FormState,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, StoreError> {
        if let Some(message) = action.confirmation() {
            if !confirm.confirm(message) {
                return Ok(false);
            }
        }
        self.perform(action, form)
    }

    /// Runs an already confirmed action. Returns `false` when the task no
    /// longer exists.
    #[tracing::instrument(skip(self, form))]
    pub fn perform(&mut self, action: Action, form: &mut FormState) -> Result<bool, StoreError> {
        match action {
            Action::Complete(id) => self.toggle_complete(id),
            Action::Edit(id) => {
                let Some(task) = self.store.find_by_id(id)? else {
                    return Ok(false);
                };
                form.prefill(&task);
                match self.edit_mode {
                    EditMode::InPlace => form.editing = Some(id),
                    EditMode::Replace => {
                        form.editing = None;
                        self.store.remove_by_id(id)?;
                    }
                }
                self.render_all();
                Ok(true)
            }
            Action::Delete(id) => {
                let removed = self.store.remove_by_id(id)?;
                if form.editing == Some(id) {
                    form.editing = None;
                }
                self.render_all();
                Ok(removed)
            }
        }
    }

    /// Leaves an in-place edit without touching the stored record.
    pub fn cancel_edit(&mut self, form: &mut FormState) {
        if form.editing.is_some() {
            form.reset_after_submit();
        }
    }

    /// Wipes the whole collection once confirmed.
    pub fn clear_all(
        &mut self,
        form: &mut FormState,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, StoreError> {
        if !confirm.confirm(CLEAR_PROMPT) {
            return Ok(false);
        }
        self.clear_confirmed(form)?;
        Ok(true)
    }

    /// Also ends any in-place edit, since its record is gone.
    pub fn clear_confirmed(&mut self, form: &mut FormState) -> Result<(), StoreError> {
        self.store.clear()?;
        form.editing = None;
        self.render_all();
        Ok(())
    }
}
