use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracker::history::HistoryTracker;
use tracker::{codec, Entry, Epic, Error, Status, Subtask, Task, TaskId, TaskStore};

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 15)
        .and_then(|day| day.and_hms_opt(hour, minute, 0))
        .expect("valid time")
}

fn scheduled(
    epic: TaskId,
    name: &str,
    status: Status,
    minutes: i64,
    start: NaiveDateTime,
) -> Subtask {
    Subtask::new(epic, name, "", status, Duration::minutes(minutes), Some(start))
}

fn ids(entries: &[Entry]) -> Vec<u64> {
    entries.iter().map(|entry| entry.id().get()).collect()
}

#[test]
fn epic_status_follows_its_subtasks() {
    let mut store = TaskStore::new();
    let epic = store.create_epic(Epic::new("E", ""));
    let a = store
        .create_subtask(scheduled(epic, "A", Status::New, 59, at(9, 0)))
        .unwrap()
        .unwrap();
    let b = store
        .create_subtask(scheduled(epic, "B", Status::New, 59, at(10, 0)))
        .unwrap()
        .unwrap();
    assert_eq!(store.get_epic(epic).unwrap().status(), Status::New);

    let done_a = store.get_subtask(a).unwrap().with_status(Status::Done);
    store.update_subtask(done_a).unwrap();
    assert_eq!(store.get_epic(epic).unwrap().status(), Status::InProgress);

    let done_b = store.get_subtask(b).unwrap().with_status(Status::Done);
    store.update_subtask(done_b).unwrap();
    let finished = store.get_epic(epic).unwrap();
    assert_eq!(finished.status(), Status::Done);
    assert_eq!(finished.start_time(), Some(at(9, 0)));
    assert_eq!(finished.end_time(), Some(at(10, 59)));
    assert_eq!(finished.duration(), Duration::minutes(118));

    store.delete_subtask(a);
    store.delete_subtask(b);
    let emptied = store.get_epic(epic).unwrap();
    assert_eq!(emptied.status(), Status::New);
    assert_eq!(emptied.duration(), Duration::zero());
    assert_eq!(emptied.start_time(), None);
    assert_eq!(emptied.end_time(), None);
}

#[test]
fn touching_windows_do_not_overlap() {
    let mut store = TaskStore::new();
    let t1 = store
        .create_task(Task::new("T1", "", Status::New, Duration::minutes(60), Some(at(10, 0))))
        .unwrap();

    let err = store
        .create_task(Task::new("T2", "", Status::New, Duration::minutes(60), Some(at(10, 59))))
        .unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, Error::Overlap { conflicting } if conflicting == t1));
    assert_eq!(store.list_tasks().len(), 1);

    store
        .create_task(Task::new("T2", "", Status::New, Duration::minutes(60), Some(at(11, 0))))
        .unwrap();
    assert_eq!(store.prioritized().len(), 2);
}

#[test]
fn subtasks_and_tasks_share_the_schedule() {
    let mut store = TaskStore::new();
    store
        .create_task(Task::new("T", "", Status::New, Duration::minutes(60), Some(at(10, 0))))
        .unwrap();
    let epic = store.create_epic(Epic::new("E", ""));

    let err = store
        .create_subtask(scheduled(epic, "S", Status::New, 30, at(10, 30)))
        .unwrap_err();
    assert!(err.is_validation());
    assert!(store.get_epic(epic).unwrap().subtask_ids().is_empty());
}

#[test]
fn loading_ids_one_to_six_continues_at_seven() {
    let text = "\
1,TASK,a,NEW,,0,2025-05-15T09:00:00,59,0
2,TASK,b,DONE,,0,,0,0
3,EPIC,c,IN_PROGRESS,,0,2025-05-15T10:00:00,118,2025-05-15T11:59:00
4,EPIC,d,NEW,,0,,0,
5,SUBTASK,e,DONE,,3,2025-05-15T10:00:00,59,0
6,SUBTASK,f,NEW,,3,2025-05-15T11:00:00,59,0
";
    let mut store = codec::decode(text, HistoryTracker::new()).unwrap();
    assert_eq!(store.len(), 6);
    assert_eq!(store.get_epic(TaskId::new(3)).unwrap().status(), Status::InProgress);
    assert_eq!(ids(&store.prioritized()), vec![1, 5, 6]);

    let next = store.create_epic(Epic::new("g", ""));
    assert_eq!(next, TaskId::new(7));
}

#[test]
fn history_moves_revisited_entries_to_the_tail() {
    let mut store = TaskStore::new();
    let x = store.create_task(Task::new("X", "", Status::New, Duration::zero(), None)).unwrap();
    let y = store.create_epic(Epic::new("Y", ""));

    store.get_task(x);
    store.get_epic(y);
    store.get_task(x);
    assert_eq!(ids(&store.history()), vec![y.get(), x.get()]);
}

#[test]
fn deleting_an_epic_cascades_everywhere() {
    let mut store = TaskStore::new();
    let epic = store.create_epic(Epic::new("E", ""));
    let sub = store
        .create_subtask(scheduled(epic, "S", Status::New, 30, at(9, 0)))
        .unwrap()
        .unwrap();
    store.get_subtask(sub);
    store.get_epic(epic);

    store.delete_epic(epic);
    assert!(store.get_subtask(sub).is_none());
    assert!(store.list_subtasks().is_empty());
    assert!(store.prioritized().is_empty());
    assert!(store.history().is_empty());
    assert!(store.epic_subtasks(epic).is_none());
}

#[test]
fn delete_all_subtasks_resets_every_epic() {
    let mut store = TaskStore::new();
    let first = store.create_epic(Epic::new("first", ""));
    let second = store.create_epic(Epic::new("second", ""));
    store
        .create_subtask(scheduled(first, "a", Status::Done, 10, at(9, 0)))
        .unwrap();
    store
        .create_subtask(scheduled(second, "b", Status::InProgress, 10, at(10, 0)))
        .unwrap();

    store.delete_all_subtasks();
    for epic in store.list_epics() {
        assert_eq!(epic.status(), Status::New);
        assert!(epic.subtask_ids().is_empty());
        assert_eq!(epic.start_time(), None);
    }
    assert!(store.prioritized().is_empty());
}

#[test]
fn ids_are_unique_across_kinds() {
    let mut store = TaskStore::new();
    let mut seen = Vec::new();
    for round in 0..5 {
        let task = Task::new(format!("t{round}"), "", Status::New, Duration::zero(), None);
        seen.push(store.create_task(task).unwrap());
        let epic = store.create_epic(Epic::new(format!("e{round}"), ""));
        seen.push(epic);
        let name = format!("s{round}");
        let subtask = Subtask::new(epic, name, "", Status::New, Duration::zero(), None);
        seen.push(store.create_subtask(subtask).unwrap().unwrap());
    }
    let mut deduped = seen.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), seen.len());
}

#[test]
fn delivered_values_are_frozen() {
    let mut store = TaskStore::new();
    let id = store
        .create_task(Task::new("before", "", Status::New, Duration::minutes(30), Some(at(9, 0))))
        .unwrap();
    let delivered = store.get_task(id).unwrap();
    store.update_task(delivered.clone().with_name("after")).unwrap();

    assert_eq!(delivered.name(), "before");
    assert_eq!(store.history()[0].name(), "before");
    assert_eq!(store.list_tasks()[0].name(), "after");
}
