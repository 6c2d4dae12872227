/// Integration tests for snapshot export and import
mod common;

use class_portal::backup::{export_snapshot, import_merge, import_overwrite};
use class_portal::models::{Collection, Payment, Quiz, Subject, User};
use class_portal::repository::{AdminSeed, Repository, ADMIN_ID};
use class_portal::storage::LocalStore;
use common::TestContext;
use serde_json::{json, Value};

fn populated_repo() -> Repository {
    let repo = Repository::new(LocalStore::in_memory().unwrap());
    repo.init(&AdminSeed {
        username: "prof".to_string(),
        password: "secret".to_string(),
    })
    .unwrap();
    let student = repo.register_student("Ana", "ana", "pw", "9EF").unwrap();
    repo.create(Payment::new(&student.id, 150.0, "2026-03-01")).unwrap();
    repo.create(Quiz::new("Frações", "", ADMIN_ID, "6EF", Subject::Math))
        .unwrap();
    repo
}

#[test]
fn test_export_then_overwrite_round_trips() {
    let source = populated_repo();
    let snapshot = export_snapshot(source.store()).unwrap();

    let ctx = TestContext::new();
    ctx.store.set_raw("results", r#"[{"id":"stale"}]"#).unwrap();
    import_overwrite(&ctx.store, &snapshot).unwrap();

    assert_eq!(ctx.reopen().entries().unwrap(), source.store().entries().unwrap());

    let target = Repository::new(ctx.reopen());
    assert_eq!(target.list::<User>().unwrap(), source.list::<User>().unwrap());
}

#[test]
fn test_export_values_are_encoded_strings() {
    let repo = populated_repo();
    let snapshot: Value = serde_json::from_str(&export_snapshot(repo.store()).unwrap()).unwrap();

    assert_eq!(snapshot["setupDone"], "true");
    let users: Vec<Value> = serde_json::from_str(snapshot["users"].as_str().unwrap()).unwrap();
    assert_eq!(users.len(), 2);
}

fn quiz_row(id: &str, title: &str) -> Value {
    let mut quiz = Quiz::new(title, "", ADMIN_ID, "6EF", Subject::Math);
    quiz.id = id.to_string();
    serde_json::to_value(quiz).unwrap()
}

#[test]
fn test_merge_example() {
    let store = LocalStore::in_memory().unwrap();
    store.write("quizzes", &[quiz_row("1", "a")]).unwrap();

    let incoming = serde_json::to_string(&[quiz_row("1", "b"), quiz_row("2", "c")]).unwrap();
    let blob = json!({ "quizzes": incoming }).to_string();
    let report = import_merge(&store, &blob).unwrap();

    let repo = Repository::new(store);
    let titles: Vec<(String, String)> = repo
        .list::<Quiz>()
        .unwrap()
        .into_iter()
        .map(|q| (q.id, q.title))
        .collect();
    assert_eq!(
        titles,
        vec![("1".to_string(), "b".to_string()), ("2".to_string(), "c".to_string())]
    );

    let counts = report.collections[&Collection::Quizzes];
    assert_eq!((counts.added, counts.replaced, counts.skipped), (1, 1, 0));
}

#[test]
fn test_collections_stay_readable_after_merge_of_partial_records() {
    let repo = populated_repo();

    let blob = r#"{"quizzes": "[{\"id\":\"q1\"}]", "users": [{"id": "x", "name": "X"}]}"#;
    let report = import_merge(repo.store(), blob).unwrap();

    assert_eq!(report.total().skipped, 2);
    assert_eq!(report.total().added, 0);
    assert_eq!(repo.list::<Quiz>().unwrap().len(), 1);
    assert_eq!(repo.list::<User>().unwrap().len(), 2);
}

#[test]
fn test_merge_leaves_absent_collections_alone() {
    let repo = populated_repo();
    let payments_before = repo.list::<Payment>().unwrap();

    import_merge(repo.store(), r#"{"attendance": [{"id": "a1", "userId": "u1", "date": "2026-03-01", "content": "x"}]}"#)
        .unwrap();

    assert_eq!(repo.list::<Payment>().unwrap(), payments_before);
    assert_eq!(repo.attendance_for_user("u1").unwrap().len(), 1);
}

#[test]
fn test_merge_into_empty_store_copies_markers() {
    let source = populated_repo();
    let snapshot = export_snapshot(source.store()).unwrap();

    let target = LocalStore::in_memory().unwrap();
    let report = import_merge(&target, &snapshot).unwrap();

    assert_eq!(target.get_raw("setupDone").unwrap().as_deref(), Some("true"));
    assert_eq!(report.collections[&Collection::Users].added, 2);
    assert_eq!(report.total().replaced, 0);
}
