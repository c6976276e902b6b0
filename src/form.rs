use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::task::{Category, Task, CATEGORY_PLACEHOLDER};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw field values as the input surface hands them over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub description: String,
    pub category: String,
    pub deadline: String,
}

/// A submission that passed validation, still without an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub deadline: NaiveDate,
}

impl ValidTask {
    pub fn into_task(self, id: u64) -> Task {
        Task::new(id, self.title, self.description, self.category, self.deadline)
    }

    pub fn apply_to(self, task: &mut Task) {
        task.title = self.title;
        task.description = self.description;
        task.category = self.category;
        task.deadline = self.deadline;
    }
}

/// Checks run in order: title, category, deadline. `today` itself is an
/// acceptable deadline.
pub fn validate(values: &FormValues, today: NaiveDate) -> Result<ValidTask, ValidationError> {
    if values.title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    if values.category == CATEGORY_PLACEHOLDER {
        return Err(ValidationError::MissingCategory);
    }
    let category = values
        .category
        .parse::<Category>()
        .map_err(|_| ValidationError::MissingCategory)?;

    // A blank or unreadable date never counts as upcoming.
    let deadline = NaiveDate::parse_from_str(values.deadline.trim(), DATE_FORMAT)
        .ok()
        .filter(|d| *d >= today)
        .ok_or(ValidationError::PastDeadline)?;

    Ok(ValidTask {
        title: values.title.clone(),
        description: values.description.clone(),
        category,
        deadline,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Category,
    Deadline,
}

impl Field {
    const ORDER: [Field; 4] = [
        Field::Title,
        Field::Description,
        Field::Category,
        Field::Deadline,
    ];

    pub fn next(self) -> Field {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Field {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Editable state behind the new-task form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub title: String,
    pub description: String,
    pub category: Option<Category>, // None shows the placeholder
    pub deadline: String,
    pub focus: Field,
    /// Task being edited in place, if any.
    pub editing: Option<u64>,
}

impl FormState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: None,
            deadline: today.format(DATE_FORMAT).to_string(),
            focus: Field::Title,
            editing: None,
        }
    }

    pub fn values(&self) -> FormValues {
        FormValues {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category_label().to_string(),
            deadline: self.deadline.clone(),
        }
    }

    pub fn category_label(&self) -> &'static str {
        self.category.map_or(CATEGORY_PLACEHOLDER, Category::label)
    }

    pub fn prefill(&mut self, task: &Task) {
        self.title = task.title.clone();
        self.description = task.description.clone();
        self.category = Some(task.category);
        self.deadline = task.deadline.format(DATE_FORMAT).to_string();
        self.focus = Field::Title;
    }

    /// Clears title and description; category and deadline are kept.
    pub fn reset_after_submit(&mut self) {
        self.title.clear();
        self.description.clear();
        self.editing = None;
        self.focus = Field::Title;
    }

    pub fn cycle_category(&mut self, forward: bool) {
        let all = Category::ALL;
        let pos = self
            .category
            .and_then(|c| all.iter().position(|x| *x == c));
        self.category = match (pos, forward) {
            (None, true) => Some(all[0]),
            (None, false) => Some(all[all.len() - 1]),
            (Some(i), true) if i + 1 < all.len() => Some(all[i + 1]),
            (Some(i), false) if i > 0 => Some(all[i - 1]),
            (Some(_), _) => None,
        };
    }

    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Title => Some(&mut self.title),
            Field::Description => Some(&mut self.description),
            Field::Deadline => Some(&mut self.deadline),
            Field::Category => None,
        }
    }
}
