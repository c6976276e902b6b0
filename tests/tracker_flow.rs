use chrono::NaiveDate;
use tasktrack::dispatch::AlwaysConfirm;
use tasktrack::form::FormState;
use tasktrack::storage::{FileStorage, Storage};
use tasktrack::store::{TaskStore, DEFAULT_KEY};
use tasktrack::task::{Category, Task};
use tasktrack::tracker::{EditMode, Tracker};
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
}

#[test]
fn file_backed_tracker_survives_reopen() {
    let temp = tempdir().expect("tempdir");
    let storage = FileStorage::open(temp.path()).expect("open storage");
    let mut tracker = Tracker::new(TaskStore::new(storage, DEFAULT_KEY), EditMode::InPlace);

    let mut form = FormState::new(today());
    form.title = "Buy milk".to_string();
    form.category = Some(Category::Errand);
    form.deadline = "2999-01-01".to_string();
    let task = tracker
        .submit_new_task(&mut form, today())
        .expect("submit should succeed");
    tracker.toggle_complete(task.id).expect("toggle");

    let raw = std::fs::read_to_string(temp.path().join("tasks.json")).expect("blob on disk");
    assert!(raw.starts_with('['));
    assert!(raw.contains("\"isCompleted\":true"));

    let reopened = TaskStore::new(FileStorage::open(temp.path()).expect("reopen"), DEFAULT_KEY);
    let stored = reopened.load_all().expect("load");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Buy milk");
    assert!(stored[0].is_completed);

    tracker
        .delete_task(task.id, &mut form, &mut AlwaysConfirm(true))
        .expect("delete");
    assert!(reopened.load_all().expect("load").is_empty());
}

#[test]
fn clear_removes_the_file() {
    let temp = tempdir().expect("tempdir");
    let storage = FileStorage::open(temp.path()).expect("open storage");
    let mut store = TaskStore::new(storage, DEFAULT_KEY);

    let due = NaiveDate::from_ymd_opt(2999, 1, 1).expect("valid date");
    let tasks = vec![
        Task::new(1, "a".into(), String::new(), Category::Work, due),
        Task::new(2, "b".into(), "second".into(), Category::Study, due),
    ];
    store.save_all(&tasks).expect("save");
    assert_eq!(store.load_all().expect("load"), tasks);

    store.clear().expect("clear");
    assert!(!temp.path().join("tasks.json").exists());
    assert_eq!(store.storage().get(DEFAULT_KEY).expect("get"), None);
    assert!(store.load_all().expect("load").is_empty());
}
