mod support;

use predicates::prelude::*;
use predicates::str::contains;
use support::TestDir;

#[test]
fn tracker_help_works() {
    let dir = TestDir::new();
    dir.tracker()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("personal task tracker"));
}

#[test]
fn subcommand_help_works() {
    let dir = TestDir::new();
    for cmd in ["task", "subtask", "epic", "list", "prioritized", "seed"] {
        dir.tracker().arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn empty_list_does_not_create_the_data_file() {
    let dir = TestDir::new();
    dir.tracker()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("0 task(s), 0 epic(s), 0 subtask(s)"));
    assert!(!dir.data_file().exists());
}

#[test]
fn task_add_writes_the_data_file() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["task", "add", "Write report", "-d", "Quarterly numbers"])
        .args(["--start", "2025-05-15T09:00", "--minutes", "59"])
        .assert()
        .success()
        .stdout(contains("Task #1 created"));

    assert_eq!(
        dir.read_data(),
        "1,TASK,Write report,NEW,Quarterly numbers,0,2025-05-15T09:00:00,59,0\n"
    );
}

#[test]
fn json_envelope_carries_the_entity() {
    let dir = TestDir::new();
    let value = dir.json(&["task", "add", "Call", "--start", "2025-05-15T09:00"]);
    assert_eq!(value["schema_version"], "tracker.v1");
    assert_eq!(value["command"], "task add");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["id"], 1);
    assert_eq!(value["data"]["kind"], "TASK");
    // default duration from config
    assert_eq!(value["data"]["duration_minutes"], 60);
    assert_eq!(value["data"]["end_time"], "2025-05-15T10:00:00");
}

#[test]
fn overlapping_task_exits_with_conflict_code() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["task", "add", "T1", "--start", "2025-05-15T10:00", "--minutes", "60"])
        .assert()
        .success();

    dir.tracker()
        .args(["task", "add", "T2", "--start", "2025-05-15T10:59", "--minutes", "60"])
        .assert()
        .code(3)
        .stderr(contains("error: Time window overlaps #1"));

    dir.tracker()
        .args(["task", "add", "T2", "--start", "2025-05-15T11:00", "--minutes", "60"])
        .assert()
        .success();
}

#[test]
fn slots_past_the_date_range_are_user_errors() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["task", "add", "Forever", "--start", "2025-05-15T09:00"])
        .args(["--minutes", "1000000000000"])
        .assert()
        .code(2)
        .stderr(contains("date range"));

    dir.tracker()
        .args(["task", "add", "Forever", "--minutes", "9223372036854775807"])
        .assert()
        .code(2);
    assert!(!dir.data_file().exists());
}

#[test]
fn json_error_envelope_on_conflict() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["task", "add", "T1", "--start", "2025-05-15T10:00"])
        .assert()
        .success();

    let output = dir
        .tracker()
        .args(["--json", "task", "add", "T2", "--start", "2025-05-15T10:30"])
        .output()
        .expect("run tracker");
    assert_eq!(output.status.code(), Some(3));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["status"], "error");
    assert_eq!(value["command"], "task add");
    assert_eq!(value["error"]["kind"], "schedule_conflict");
    assert_eq!(value["error"]["details"]["conflicting_id"], 1);
}

#[test]
fn unknown_ids_are_user_errors() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["task", "show", "42"])
        .assert()
        .code(2)
        .stderr(contains("TASK not found: #42"));

    dir.tracker()
        .args(["subtask", "add", "7", "Orphan"])
        .assert()
        .code(2)
        .stderr(contains("EPIC not found: #7"));
    assert!(!dir.data_file().exists());
}

#[test]
fn commas_in_names_are_rejected() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["epic", "add", "Move, then unpack"])
        .assert()
        .code(2)
        .stderr(contains("commas"));
}

#[test]
fn epic_progress_follows_subtasks() {
    let dir = TestDir::new();
    dir.tracker().args(["epic", "add", "Move"]).assert().success();
    dir.tracker()
        .args(["subtask", "add", "1", "Pack", "--start", "2025-05-15T09:00", "--minutes", "59"])
        .assert()
        .success();
    dir.tracker()
        .args(["subtask", "add", "1", "Drive", "--start", "2025-05-15T10:00", "--minutes", "59"])
        .assert()
        .success();

    let epic = dir.json(&["epic", "show", "1"]);
    assert_eq!(epic["data"]["status"], "NEW");
    assert_eq!(epic["data"]["subtask_ids"], serde_json::json!([2, 3]));

    dir.tracker()
        .args(["subtask", "update", "2", "--status", "done"])
        .assert()
        .success();
    let epic = dir.json(&["epic", "show", "1"]);
    assert_eq!(epic["data"]["status"], "IN_PROGRESS");
    assert_eq!(epic["data"]["duration_minutes"], 118);
    assert_eq!(epic["data"]["end_time"], "2025-05-15T10:59:00");

    dir.tracker()
        .args(["subtask", "update", "3", "--status", "DONE"])
        .assert()
        .success();
    let epic = dir.json(&["epic", "show", "1"]);
    assert_eq!(epic["data"]["status"], "DONE");

    dir.tracker().args(["subtask", "clear"]).assert().success();
    let epic = dir.json(&["epic", "show", "1"]);
    assert_eq!(epic["data"]["status"], "NEW");
    assert_eq!(epic["data"]["duration_minutes"], 0);
    assert!(epic["data"]["start_time"].is_null());
}

#[test]
fn epic_update_only_renames() {
    let dir = TestDir::new();
    dir.tracker().args(["epic", "add", "Move"]).assert().success();
    dir.tracker()
        .args(["subtask", "add", "1", "Pack", "--status", "DONE"])
        .assert()
        .success();

    let epic = dir.json(&["epic", "update", "1", "--name", "Relocate"]);
    assert_eq!(epic["data"]["name"], "Relocate");
    assert_eq!(epic["data"]["status"], "DONE");
    assert_eq!(epic["data"]["subtask_ids"], serde_json::json!([2]));
}

#[test]
fn epic_rm_cascades_to_subtasks() {
    let dir = TestDir::new();
    dir.tracker().args(["epic", "add", "Move"]).assert().success();
    dir.tracker()
        .args(["subtask", "add", "1", "Pack", "--start", "2025-05-15T09:00"])
        .assert()
        .success();

    dir.tracker()
        .args(["epic", "rm", "1"])
        .assert()
        .success()
        .stdout(contains("subtasks deleted: 1"));
    dir.tracker().args(["subtask", "show", "2"]).assert().code(2);
    assert_eq!(dir.read_data(), "");
}

#[test]
fn subtask_can_move_between_epics() {
    let dir = TestDir::new();
    dir.tracker().args(["epic", "add", "First"]).assert().success();
    dir.tracker().args(["epic", "add", "Second"]).assert().success();
    dir.tracker()
        .args(["subtask", "add", "1", "Pack", "--status", "DONE"])
        .assert()
        .success();

    dir.tracker()
        .args(["subtask", "update", "3", "--epic", "9"])
        .assert()
        .code(2)
        .stderr(contains("EPIC not found: #9"));

    dir.tracker()
        .args(["subtask", "update", "3", "--epic", "2"])
        .assert()
        .success();
    let subtasks = dir.json(&["epic", "subtasks", "2"]);
    assert_eq!(subtasks["data"][0]["id"], 3);
    let first = dir.json(&["epic", "show", "1"]);
    assert_eq!(first["data"]["status"], "NEW");
}

#[test]
fn prioritized_orders_by_start_time() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["task", "add", "Late", "--start", "2025-05-15T15:00"])
        .assert()
        .success();
    dir.tracker().args(["task", "add", "Whenever"]).assert().success();
    dir.tracker()
        .args(["task", "add", "Early", "--start", "2025-05-15T08:00"])
        .assert()
        .success();

    let value = dir.json(&["prioritized"]);
    let names: Vec<&str> = value["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Early", "Late"]);
}

#[test]
fn task_update_can_unschedule() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["task", "add", "Call", "--start", "2025-05-15T08:00"])
        .assert()
        .success();
    dir.tracker()
        .args(["task", "update", "1", "--unschedule", "--status", "in_progress"])
        .assert()
        .success();

    assert_eq!(dir.read_data(), "1,TASK,Call,IN_PROGRESS,,0,,60,0\n");
    let value = dir.json(&["prioritized"]);
    assert_eq!(value["data"], serde_json::json!([]));
}

#[test]
fn seed_runs_once() {
    let dir = TestDir::new();
    let value = dir.json(&["seed"]);
    assert_eq!(value["data"]["skipped"], false);
    assert_eq!(value["data"]["created"].as_array().map(Vec::len), Some(6));

    let listed = dir.json(&["list"]);
    assert_eq!(listed["data"]["tasks"].as_array().map(Vec::len), Some(2));
    assert_eq!(listed["data"]["epics"].as_array().map(Vec::len), Some(2));
    assert_eq!(listed["data"]["subtasks"].as_array().map(Vec::len), Some(2));

    dir.tracker()
        .arg("seed")
        .assert()
        .success()
        .stdout(contains("Nothing seeded"));
    let again = dir.json(&["list"]);
    assert_eq!(again["data"]["tasks"].as_array().map(Vec::len), Some(2));
}

#[test]
fn quiet_suppresses_human_output() {
    let dir = TestDir::new();
    dir.tracker()
        .args(["-q", "epic", "add", "Silent"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn malformed_data_file_fails_with_operation_code() {
    let dir = TestDir::new();
    dir.write_file("data/tasks.csv", "1,TASK,broken\n");
    dir.tracker()
        .arg("list")
        .assert()
        .code(4)
        .stderr(contains("line 1"));
}
