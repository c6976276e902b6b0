use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label shown by the category selector before anything is picked.
pub const CATEGORY_PLACEHOLDER: &str = "Select";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Errand,
    Study,
    Health,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Personal,
        Category::Errand,
        Category::Study,
        Category::Health,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Errand => "Errand",
            Category::Study => "Study",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Completed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub deadline: NaiveDate, // serialized as YYYY-MM-DD
    pub is_completed: bool,
}

impl Task {
    pub fn new(
        id: u64,
        title: String,
        description: String,
        category: Category,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            id,
            title,
            description,
            category,
            deadline,
            is_completed: false,
        }
    }

    pub fn status(&self) -> Status {
        if self.is_completed {
            Status::Completed
        } else {
            Status::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn milk() -> Task {
        Task::new(
            42,
            "Buy milk".to_string(),
            String::new(),
            Category::Errand,
            NaiveDate::from_ymd_opt(2999, 1, 1).unwrap(),
        )
    }

    #[test]
    fn serializes_with_persisted_field_names() {
        let value = serde_json::to_value(milk()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 42,
                "title": "Buy milk",
                "description": "",
                "category": "Errand",
                "deadline": "2999-01-01",
                "isCompleted": false
            })
        );
    }

    #[test]
    fn status_follows_completion_flag() {
        let mut task = milk();
        assert_eq!(task.status().label(), "Pending");
        task.is_completed = true;
        assert_eq!(task.status().label(), "Completed");
    }

    #[test]
    fn placeholder_is_not_a_category() {
        assert!(CATEGORY_PLACEHOLDER.parse::<Category>().is_err());
        assert_eq!("errand".parse::<Category>(), Ok(Category::Errand));
    }
}
