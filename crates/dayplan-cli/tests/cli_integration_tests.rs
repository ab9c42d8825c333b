use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn dayplan(temp_dir: &TempDir) -> Command {
    let db_path = temp_dir.path().join("test.db");
    let mut cmd = Command::cargo_bin("dayplan").expect("binary builds");
    cmd.current_dir(temp_dir.path())
        .env("DAYPLAN_DATABASE_PATH", db_path.to_string_lossy().to_string())
        .env("DAYPLAN_TIMEZONE", "UTC");
    cmd
}

#[test]
fn test_labels_are_seeded_on_first_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    dayplan(&temp_dir)
        .args(["labels"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REPEATED"))
        .stdout(predicate::str::contains("DRAFT"));
}

#[test]
fn test_add_and_list_roundtrip() {
    let temp_dir = tempfile::tempdir().unwrap();

    dayplan(&temp_dir)
        .args([
            "add",
            "Morning Gym",
            "--start",
            "2025-06-10 08:00",
            "--end",
            "2025-06-10 09:00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created work"));

    dayplan(&temp_dir)
        .args(["list", "--search", "gym"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Morning Gym"));
}

#[test]
fn test_overlapping_add_is_rejected_with_stable_code() {
    let temp_dir = tempfile::tempdir().unwrap();

    dayplan(&temp_dir)
        .args([
            "add",
            "Standup",
            "--start",
            "2025-06-10 08:00",
            "--end",
            "2025-06-10 09:00",
        ])
        .assert()
        .success();

    dayplan(&temp_dir)
        .args([
            "add",
            "Clash",
            "--start",
            "2025-06-10 08:30",
            "--end",
            "2025-06-10 09:30",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("code 10006"));
}

#[test]
fn test_recover_empty_day() {
    let temp_dir = tempfile::tempdir().unwrap();

    dayplan(&temp_dir)
        .args(["recover", "2025-06-01", "2025-06-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to recover"));
}

#[test]
fn test_recover_flags_conflicts_and_drafts_can_be_discarded() {
    let temp_dir = tempfile::tempdir().unwrap();

    dayplan(&temp_dir)
        .args([
            "add",
            "Gym",
            "--start",
            "2025-06-01 08:00",
            "--end",
            "2025-06-01 09:00",
        ])
        .assert()
        .success();
    dayplan(&temp_dir)
        .args([
            "add",
            "Breakfast",
            "--start",
            "2025-06-05 08:30",
            "--end",
            "2025-06-05 09:30",
        ])
        .assert()
        .success();

    dayplan(&temp_dir)
        .args(["recover", "2025-06-01", "2025-06-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFLICT"));
}
