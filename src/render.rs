use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

use crate::task::{Status, Task};

/// Terminal lines occupied by one task row.
pub const ROW_HEIGHT: u16 = 3;

const CONTROL_WIDTH: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Complete,
    Edit,
    Delete,
}

impl Control {
    pub const ALL: [Control; 3] = [Control::Complete, Control::Edit, Control::Delete];

    pub fn glyph(self) -> &'static str {
        match self {
            Control::Complete => "[✓]",
            Control::Edit => "[✎]",
            Control::Delete => "[✗]",
        }
    }

    /// Column of the control relative to the row's left edge.
    fn column(self) -> u16 {
        match self {
            Control::Complete => 0,
            Control::Edit => CONTROL_WIDTH + 1,
            Control::Delete => 2 * (CONTROL_WIDTH + 1),
        }
    }
}

/// What a click inside the list landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickTarget {
    pub task_id: Option<u64>,
    pub control: Option<Control>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub deadline: String,
    pub status: Status,
}

impl TaskRow {
    pub fn completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn to_list_item(&self, selected: bool) -> ListItem<'static> {
        let mut controls: Vec<Span> = Vec::new();
        for control in Control::ALL {
            controls.push(Span::styled(
                control.glyph(),
                Style::default().fg(Color::Cyan),
            ));
            controls.push(Span::raw(" "));
        }

        let mut title_style = Style::default().fg(Color::White);
        if selected {
            title_style = title_style.add_modifier(Modifier::BOLD);
        }
        controls.push(Span::styled(self.title.clone(), title_style));
        controls.push(Span::raw(format!("  ({})", self.status.label())));

        let lines = vec![
            Line::from(controls),
            Line::from(Span::raw(format!("    {}", self.description))),
            Line::from(vec![
                Span::styled("    Category: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(self.category.clone()),
                Span::styled("  Deadline: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(self.deadline.clone()),
            ]),
        ];

        let item = ListItem::new(lines);
        if self.completed() {
            item.style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT),
            )
        } else {
            item
        }
    }

    /// Single-line form used by the command line `list`.
    pub fn summary(&self) -> String {
        format!(
            "[#{}] {} ({}) | {} | due {} | {}",
            self.id,
            self.title,
            self.status.label(),
            self.category,
            self.deadline,
            self.description
        )
    }
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category.to_string(),
            deadline: task.deadline.to_string(),
            status: task.status(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Renderer {
    rows: Vec<TaskRow>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the visual list with one row per task, in order.
    pub fn redraw(&mut self, tasks: &[Task]) {
        self.rows = tasks.iter().map(TaskRow::from).collect();
    }

    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn list_items(&self, selected: Option<usize>) -> Vec<ListItem<'static>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row.to_list_item(selected == Some(i)))
            .collect()
    }

    /// Maps a terminal cell inside the list's inner `area`, scrolled by
    /// `offset` rows, onto the task and control drawn there.
    pub fn hit_test(&self, area: Rect, offset: usize, column: u16, row: u16) -> ClickTarget {
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return ClickTarget::default();
        }

        let dy = row - area.y;
        let index = offset + (dy / ROW_HEIGHT) as usize;
        let Some(task_row) = self.rows.get(index) else {
            return ClickTarget::default();
        };

        let control = if dy % ROW_HEIGHT == 0 {
            let dx = column - area.x;
            Control::ALL
                .into_iter()
                .find(|c| dx >= c.column() && dx < c.column() + CONTROL_WIDTH)
        } else {
            None
        };

        ClickTarget {
            task_id: Some(task_row.id),
            control,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Category;
    use chrono::NaiveDate;

    fn tasks() -> Vec<Task> {
        let due = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap();
        let mut done = Task::new(2, "Ship".into(), "release".into(), Category::Work, due);
        done.is_completed = true;
        vec![
            Task::new(1, "Buy milk".into(), String::new(), Category::Errand, due),
            done,
        ]
    }

    #[test]
    fn redraw_is_idempotent_and_ordered() {
        let mut renderer = Renderer::new();
        renderer.redraw(&tasks());
        let first = renderer.rows().to_vec();
        renderer.redraw(&tasks());
        assert_eq!(renderer.rows(), first.as_slice());

        assert_eq!(first[0].id, 1);
        assert_eq!(first[0].status.label(), "Pending");
        assert_eq!(first[1].status.label(), "Completed");
        assert!(first[1].completed());
        assert_eq!(first[1].deadline, "2999-01-01");
        assert_eq!(first[1].category, "Work");
    }

    #[test]
    fn redraw_with_empty_collection_clears_rows() {
        let mut renderer = Renderer::new();
        renderer.redraw(&tasks());
        renderer.redraw(&[]);
        assert!(renderer.rows().is_empty());
    }

    #[test]
    fn hit_test_finds_row_and_control() {
        let mut renderer = Renderer::new();
        renderer.redraw(&tasks());
        let area = Rect::new(10, 5, 40, 12);

        let hit = renderer.hit_test(area, 0, 10, 5);
        assert_eq!(hit.task_id, Some(1));
        assert_eq!(hit.control, Some(Control::Complete));

        let hit = renderer.hit_test(area, 0, 15, 8);
        assert_eq!(hit.task_id, Some(2));
        assert_eq!(hit.control, Some(Control::Edit));

        let hit = renderer.hit_test(area, 0, 19, 8);
        assert_eq!(hit.control, Some(Control::Delete));

        // second line of a row carries no controls
        let hit = renderer.hit_test(area, 0, 10, 6);
        assert_eq!(hit.task_id, Some(1));
        assert_eq!(hit.control, None);
    }

    #[test]
    fn hit_test_outside_rows_is_empty() {
        let mut renderer = Renderer::new();
        renderer.redraw(&tasks());
        let area = Rect::new(0, 0, 40, 12);

        assert_eq!(renderer.hit_test(area, 0, 0, 9), ClickTarget::default());
        assert_eq!(renderer.hit_test(area, 0, 45, 0), ClickTarget::default());
        assert_eq!(renderer.hit_test(area, 1, 0, 0).task_id, Some(2));
    }
}
