use chrono::{DateTime, Utc};
use dayplan_core::db::establish_connection;
use dayplan_core::error::{CoreError, ErrorCode};
use dayplan_core::goals::GoalService;
use dayplan_core::labels::{keys, LabelService};
use dayplan_core::models::*;
use dayplan_core::recovery::RecoveryService;
use dayplan_core::repository::{
    LabelRepository, SqliteRepository, SubTaskRepository, WorkRepository,
};
use dayplan_core::works::WorkService;
use std::sync::Arc;
use tempfile::TempDir;

/// Helper function to create a seeded test database
async fn setup_test_db() -> (Arc<SqliteRepository>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    let repository = Arc::new(SqliteRepository::new(pool));
    LabelService::new(Arc::clone(&repository))
        .seed()
        .await
        .expect("Failed to seed labels");

    (repository, temp_dir)
}

struct TestLabels {
    daily: Label,
    repeated: Label,
    pending: Label,
    easy: Label,
    urgent: Label,
    category_work: Label,
}

async fn load_labels(repo: &SqliteRepository) -> TestLabels {
    async fn by_key(repo: &SqliteRepository, key: &str) -> Label {
        repo.find_label_by_key(key)
            .await
            .expect("label query failed")
            .unwrap_or_else(|| panic!("label {key} not seeded"))
    }

    TestLabels {
        daily: by_key(repo, keys::DAILY).await,
        repeated: by_key(repo, keys::REPEATED).await,
        pending: by_key(repo, keys::PENDING).await,
        easy: by_key(repo, keys::EASY).await,
        urgent: by_key(repo, keys::IMPORTANT_URGENT).await,
        category_work: by_key(repo, keys::CATEGORY_WORK).await,
    }
}

fn at(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC 3339 instant")
}

fn ms(s: &str) -> i64 {
    at(s).timestamp_millis()
}

fn work_payload(owner: &str, name: &str, start: &str, end: &str, labels: &TestLabels) -> UpsertWorkData {
    UpsertWorkData {
        owner_id: owner.to_string(),
        name: name.to_string(),
        start_date: Some(ms(start)),
        end_date: ms(end),
        type_id: labels.daily.id.to_string(),
        status_id: labels.pending.id.to_string(),
        difficulty_id: labels.easy.id.to_string(),
        priority_id: labels.urgent.id.to_string(),
        category_id: labels.category_work.id.to_string(),
        ..Default::default()
    }
}

fn expect_code(result: Result<impl std::fmt::Debug, CoreError>, code: ErrorCode) {
    match result {
        Err(CoreError::Validation(ve)) => assert_eq!(ve.code, code, "unexpected code: {ve:?}"),
        other => panic!("expected validation error {code:?}, got {other:?}"),
    }
}

#[tokio::test]
async fn test_basic_work_crud_workflow() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));

    let mut payload = work_payload(
        "user-1",
        "Morning Gym",
        "2025-06-10T08:00:00Z",
        "2025-06-10T09:00:00Z",
        &labels,
    );
    payload.sub_tasks = vec![
        SubTaskData {
            id: None,
            name: "Warm up".to_string(),
            is_completed: false,
        },
        SubTaskData {
            id: None,
            name: "Stretch".to_string(),
            is_completed: true,
        },
    ];

    let outcome = works.upsert_work(&payload).await.expect("create failed");
    assert!(outcome.created);

    let view = works
        .get_work("user-1", &outcome.work_id.to_string())
        .await
        .expect("get failed");
    assert_eq!(view.name, "Morning Gym");
    assert_eq!(view.status.key, keys::PENDING);
    assert_eq!(view.work_type.key, keys::DAILY);
    assert_eq!(view.sub_tasks.len(), 2);
    assert!(view.draft.is_none());

    // Update: rename, keep one subtask, add one, drop one
    let stored = repo
        .find_sub_tasks_by_work(outcome.work_id)
        .await
        .expect("subtask fetch failed");
    let kept = stored.iter().find(|t| t.name == "Warm up").unwrap();

    let mut update = payload.clone();
    update.id = Some(outcome.work_id.to_string());
    update.name = "Evening Gym".to_string();
    update.sub_tasks = vec![
        SubTaskData {
            id: Some(kept.id.to_string()),
            name: "Warm up properly".to_string(),
            is_completed: true,
        },
        SubTaskData {
            id: None,
            name: "Cool down".to_string(),
            is_completed: false,
        },
    ];

    let updated = works.upsert_work(&update).await.expect("update failed");
    assert!(!updated.created);
    assert_eq!(updated.work_id, outcome.work_id);

    let view = works
        .get_work("user-1", &outcome.work_id.to_string())
        .await
        .expect("get after update failed");
    assert_eq!(view.name, "Evening Gym");
    let mut names: Vec<_> = view.sub_tasks.iter().map(|t| t.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Cool down", "Warm up properly"]);

    works
        .delete_work("user-1", &outcome.work_id.to_string())
        .await
        .expect("delete failed");
    assert!(repo
        .find_work_by_id(outcome.work_id)
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .find_sub_tasks_by_work(outcome.work_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_overlap_rejected_but_touching_allowed() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));

    works
        .upsert_work(&work_payload(
            "user-1",
            "Standup",
            "2025-06-10T08:00:00Z",
            "2025-06-10T09:00:00Z",
            &labels,
        ))
        .await
        .expect("first work failed");

    // Intersecting interval is rejected
    expect_code(
        works
            .upsert_work(&work_payload(
                "user-1",
                "Clash",
                "2025-06-10T08:30:00Z",
                "2025-06-10T09:30:00Z",
                &labels,
            ))
            .await,
        ErrorCode::TimeOverlap,
    );

    // Touching edges are not overlaps
    works
        .upsert_work(&work_payload(
            "user-1",
            "Follow-up",
            "2025-06-10T09:00:00Z",
            "2025-06-10T10:00:00Z",
            &labels,
        ))
        .await
        .expect("touching work should be accepted");

    // A different owner is unaffected
    works
        .upsert_work(&work_payload(
            "user-2",
            "Other user",
            "2025-06-10T08:00:00Z",
            "2025-06-10T09:00:00Z",
            &labels,
        ))
        .await
        .expect("other owner's schedule is independent");
}

#[tokio::test]
async fn test_update_excludes_own_interval() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));

    let payload = work_payload(
        "user-1",
        "Deep work",
        "2025-06-10T13:00:00Z",
        "2025-06-10T15:00:00Z",
        &labels,
    );
    let outcome = works.upsert_work(&payload).await.expect("create failed");

    // Re-submitting the unchanged interval must not collide with itself
    let mut update = payload.clone();
    update.id = Some(outcome.work_id.to_string());
    works
        .upsert_work(&update)
        .await
        .expect("self-overlap must be excluded");
}

#[tokio::test]
async fn test_date_sanity_codes_are_distinct() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));

    let zero = work_payload(
        "user-1",
        "Zero",
        "2025-06-10T08:00:00Z",
        "2025-06-10T08:00:00Z",
        &labels,
    );
    expect_code(works.upsert_work(&zero).await, ErrorCode::ZeroDuration);

    let backwards = work_payload(
        "user-1",
        "Backwards",
        "2025-06-10T09:00:00Z",
        "2025-06-10T08:00:00Z",
        &labels,
    );
    expect_code(works.upsert_work(&backwards).await, ErrorCode::EndDateBeforeStart);
}

#[tokio::test]
async fn test_referential_validation() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));

    // Unknown label id
    let mut unknown_label = work_payload(
        "user-1",
        "Bad label",
        "2025-06-10T08:00:00Z",
        "2025-06-10T09:00:00Z",
        &labels,
    );
    unknown_label.status_id = uuid::Uuid::now_v7().to_string();
    expect_code(works.upsert_work(&unknown_label).await, ErrorCode::LabelNotFound);

    // Malformed label id
    let mut malformed = work_payload(
        "user-1",
        "Malformed",
        "2025-06-10T08:00:00Z",
        "2025-06-10T09:00:00Z",
        &labels,
    );
    malformed.type_id = "not-a-uuid".to_string();
    expect_code(works.upsert_work(&malformed).await, ErrorCode::LabelNotFound);

    // Update of a missing work
    let mut missing = work_payload(
        "user-1",
        "Missing",
        "2025-06-11T08:00:00Z",
        "2025-06-11T09:00:00Z",
        &labels,
    );
    missing.id = Some(uuid::Uuid::now_v7().to_string());
    expect_code(works.upsert_work(&missing).await, ErrorCode::WorkNotFound);

    // Update of someone else's work
    let theirs = works
        .upsert_work(&work_payload(
            "user-2",
            "Theirs",
            "2025-06-12T08:00:00Z",
            "2025-06-12T09:00:00Z",
            &labels,
        ))
        .await
        .unwrap();
    let mut stolen = work_payload(
        "user-1",
        "Stolen",
        "2025-06-13T08:00:00Z",
        "2025-06-13T09:00:00Z",
        &labels,
    );
    stolen.id = Some(theirs.work_id.to_string());
    expect_code(works.upsert_work(&stolen).await, ErrorCode::WorkForbidden);
}

fn repeated_payload(owner: &str, labels: &TestLabels) -> UpsertWorkData {
    let mut payload = work_payload(
        owner,
        "Daily run",
        "2025-06-01T06:00:00Z",
        "2025-06-01T07:00:00Z",
        labels,
    );
    payload.type_id = labels.repeated.id.to_string();
    payload.repeat_first_day = Some(ms("2025-06-10T00:00:00Z"));
    payload.repeat_last_day = Some(ms("2025-06-14T00:00:00Z"));
    payload
}

#[tokio::test]
async fn test_repeated_work_validation() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));

    // Clean window is accepted
    works
        .upsert_work(&repeated_payload("user-1", &labels))
        .await
        .expect("conflict-free repeat window should be accepted");

    // Missing window
    let mut missing = repeated_payload("user-2", &labels);
    missing.repeat_first_day = None;
    expect_code(works.upsert_work(&missing).await, ErrorCode::RepeatWindowMissing);

    // Reversed window
    let mut reversed = repeated_payload("user-2", &labels);
    reversed.repeat_first_day = Some(ms("2025-06-14T00:00:00Z"));
    reversed.repeat_last_day = Some(ms("2025-06-10T00:00:00Z"));
    expect_code(works.upsert_work(&reversed).await, ErrorCode::RepeatWindowInvalid);

    // Duration of a full day or more
    let mut too_long = repeated_payload("user-2", &labels);
    too_long.start_date = Some(ms("2025-06-01T06:00:00Z"));
    too_long.end_date = ms("2025-06-02T06:00:00Z");
    expect_code(works.upsert_work(&too_long).await, ErrorCode::RepeatWindowInvalid);
}

#[tokio::test]
async fn test_repeated_work_reports_first_conflicting_day() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));

    // Existing works on day 3 and day 5 of the window; day 3 must win.
    works
        .upsert_work(&work_payload(
            "user-1",
            "Dentist",
            "2025-06-12T06:30:00Z",
            "2025-06-12T07:30:00Z",
            &labels,
        ))
        .await
        .unwrap();
    works
        .upsert_work(&work_payload(
            "user-1",
            "Errand",
            "2025-06-14T06:30:00Z",
            "2025-06-14T07:30:00Z",
            &labels,
        ))
        .await
        .unwrap();

    let result = works.upsert_work(&repeated_payload("user-1", &labels)).await;
    match result {
        Err(CoreError::Validation(ve)) => {
            assert_eq!(ve.code, ErrorCode::TimeOverlap);
            assert!(
                ve.message.contains("2025-06-12"),
                "first conflicting date should be named: {}",
                ve.message
            );
            assert!(!ve.message.contains("2025-06-14"));
        }
        other => panic!("expected TimeOverlap, got {other:?}"),
    }
}

#[tokio::test]
async fn test_recovery_clones_day_with_conflict_flags() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));
    let recovery = RecoveryService::new(Arc::clone(&repo));

    // Source day: one work with a subtask
    let mut gym = work_payload(
        "user-1",
        "Gym",
        "2025-06-01T08:00:00Z",
        "2025-06-01T09:00:00Z",
        &labels,
    );
    gym.sub_tasks = vec![SubTaskData {
        id: None,
        name: "Squats".to_string(),
        is_completed: true,
    }];
    works.upsert_work(&gym).await.unwrap();

    // Target day already has a colliding work
    works
        .upsert_work(&work_payload(
            "user-1",
            "Breakfast meeting",
            "2025-06-05T08:30:00Z",
            "2025-06-05T09:30:00Z",
            &labels,
        ))
        .await
        .unwrap();

    let recovered = recovery
        .recover_day("user-1", ms("2025-06-01T00:00:00Z"), ms("2025-06-05T00:00:00Z"))
        .await
        .expect("recovery failed");

    assert_eq!(recovered.len(), 1);
    let item = &recovered[0];
    assert_eq!(item.work.name, "Gym");
    assert!(item.is_conflict);
    assert_eq!(item.work.start_date, Some(at("2025-06-05T08:00:00Z")));
    assert_eq!(item.work.end_date, at("2025-06-05T09:00:00Z"));
    assert_eq!(item.work.status.key, keys::IN_PROGRESS);
    assert!(item.work.draft.is_some(), "clone must be tagged as draft");

    // The clone is persisted, conflict or not
    let clone = repo.find_work_by_id(item.work.id).await.unwrap().unwrap();
    assert!(clone.is_draft());

    // Subtask clones have fresh identity and reset completion
    let clone_subs = repo.find_sub_tasks_by_work(clone.id).await.unwrap();
    assert_eq!(clone_subs.len(), 1);
    assert_eq!(clone_subs[0].name, "Squats");
    assert!(!clone_subs[0].is_completed);
}

#[tokio::test]
async fn test_recovery_of_empty_day_writes_nothing() {
    let (repo, _temp_dir) = setup_test_db().await;
    let recovery = RecoveryService::new(Arc::clone(&repo));

    let recovered = recovery
        .recover_day("user-1", ms("2025-06-01T00:00:00Z"), ms("2025-06-05T00:00:00Z"))
        .await
        .expect("recovery of empty day failed");
    assert!(recovered.is_empty());

    let remaining = repo
        .find_works_touching_range("user-1", at("2025-06-05T00:00:00Z"), at("2025-06-05T23:59:59Z"))
        .await
        .unwrap();
    assert!(remaining.is_empty(), "no clones should have been inserted");
}

#[tokio::test]
async fn test_recovery_is_idempotent() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));
    let recovery = RecoveryService::new(Arc::clone(&repo));

    for (name, start, end) in [
        ("Gym", "2025-06-01T08:00:00Z", "2025-06-01T09:00:00Z"),
        ("Reading", "2025-06-01T20:00:00Z", "2025-06-01T21:00:00Z"),
    ] {
        works
            .upsert_work(&work_payload("user-1", name, start, end, &labels))
            .await
            .unwrap();
    }

    let source = ms("2025-06-01T00:00:00Z");
    let target = ms("2025-06-05T00:00:00Z");
    recovery.recover_day("user-1", source, target).await.unwrap();
    let second = recovery.recover_day("user-1", source, target).await.unwrap();
    assert_eq!(second.len(), 2);

    // Exactly one clone set on the target day, not two
    let on_target = repo
        .find_works_touching_range("user-1", at("2025-06-05T00:00:00Z"), at("2025-06-05T23:59:59Z"))
        .await
        .unwrap();
    assert_eq!(on_target.len(), 2);
    assert!(on_target.iter().all(|w| w.is_draft()));
}

#[tokio::test]
async fn test_commit_and_discard_drafts() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));
    let recovery = RecoveryService::new(Arc::clone(&repo));

    for (name, start, end) in [
        ("Gym", "2025-06-01T08:00:00Z", "2025-06-01T09:00:00Z"),
        ("Reading", "2025-06-01T20:00:00Z", "2025-06-01T21:00:00Z"),
    ] {
        works
            .upsert_work(&work_payload("user-1", name, start, end, &labels))
            .await
            .unwrap();
    }

    let recovered = recovery
        .recover_day("user-1", ms("2025-06-01T00:00:00Z"), ms("2025-06-05T00:00:00Z"))
        .await
        .unwrap();
    let (commit_id, discard_id) = (
        recovered[0].work.id.to_string(),
        recovered[1].work.id.to_string(),
    );

    let committed = recovery
        .commit_drafts("user-1", &[commit_id.clone()])
        .await
        .unwrap();
    assert_eq!(committed, 1);
    let committed_work = repo
        .find_work_by_id(recovered[0].work.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!committed_work.is_draft());

    // Committing again is a no-op: the work is no longer a draft
    let recommitted = recovery.commit_drafts("user-1", &[commit_id]).await.unwrap();
    assert_eq!(recommitted, 0);

    // A foreign owner cannot discard the draft
    let foreign = recovery
        .discard_drafts("user-2", &[discard_id.clone()])
        .await
        .unwrap();
    assert_eq!(foreign, 0);

    let discarded = recovery.discard_drafts("user-1", &[discard_id]).await.unwrap();
    assert_eq!(discarded, 1);
    assert!(repo
        .find_work_by_id(recovered[1].work.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_list_works_with_search_and_overdue() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let works = WorkService::new(Arc::clone(&repo));

    works
        .upsert_work(&work_payload(
            "user-1",
            "Học Tiếng Việt",
            "2020-01-01T08:00:00Z",
            "2020-01-01T09:00:00Z",
            &labels,
        ))
        .await
        .unwrap();
    works
        .upsert_work(&work_payload(
            "user-1",
            "Morning Gym",
            "2020-01-02T08:00:00Z",
            "2020-01-02T09:00:00Z",
            &labels,
        ))
        .await
        .unwrap();

    let query = WorkQuery {
        owner_id: "user-1".to_string(),
        search: Some("tieng".to_string()),
        ..Default::default()
    };
    let (views, total) = works.list_works(&query).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(views[0].name, "Học Tiếng Việt");
    // 2020 is long past: listing decorates with the overdue label
    assert!(views[0].overdue.is_some());
}

#[tokio::test]
async fn test_goal_cap_and_ownership() {
    let (repo, _temp_dir) = setup_test_db().await;
    let labels = load_labels(&repo).await;
    let goals = GoalService::new(Arc::clone(&repo));

    let payload = |name: &str, owner: &str| UpsertGoalData {
        owner_id: owner.to_string(),
        name: name.to_string(),
        status_id: labels.pending.id.to_string(),
        difficulty_id: labels.easy.id.to_string(),
        priority_id: labels.urgent.id.to_string(),
        ..Default::default()
    };

    for i in 0..5 {
        goals
            .upsert_goal(&payload(&format!("Goal {i}"), "user-1"))
            .await
            .expect("goal under the cap should be accepted");
    }
    expect_code(
        goals.upsert_goal(&payload("One too many", "user-1")).await,
        ErrorCode::GoalLimitExceeded,
    );

    // The cap is per owner
    let other = goals
        .upsert_goal(&payload("Other user's goal", "user-2"))
        .await
        .expect("other owner is unaffected");

    expect_code(
        goals.delete_goal("user-1", &other.to_string()).await,
        ErrorCode::GoalForbidden,
    );
    goals
        .delete_goal("user-2", &other.to_string())
        .await
        .expect("owner can delete");
}

#[tokio::test]
async fn test_label_seeding_is_idempotent() {
    let (repo, _temp_dir) = setup_test_db().await;
    let service = LabelService::new(Arc::clone(&repo));

    let count = repo.count_labels().await.unwrap();
    assert!(count > 0);

    service.seed().await.expect("second seed must be a no-op");
    assert_eq!(repo.count_labels().await.unwrap(), count);

    let grouped = service.labels_grouped().await.unwrap();
    let (kind, statuses) = grouped
        .iter()
        .find(|(kind, _)| *kind == LabelKind::Status)
        .unwrap();
    assert_eq!(*kind, LabelKind::Status);
    assert_eq!(statuses.len(), 5);
}
