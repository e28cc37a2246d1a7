//! End-to-end complaint lifecycle against a real database.
//! Run with `TEST_DATABASE_URL=... cargo test -p tests -- --ignored`.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::UserRole;
use uuid::Uuid;

use crate::common::{
    backdate, create_complaint_via_api, get, patch_json, post_json, test_app, test_user,
};

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn submitted_complaint_starts_pending() {
    let (app, _pool, _guard) = test_app().await;
    let student = test_user(UserRole::Student, None);
    let dept = Uuid::new_v4();

    let created = create_complaint_via_api(&app, &student, dept, "ca_mark").await;
    assert_eq!(created["status"], "pending");
    assert_eq!(created["category"], "ca_mark");
    assert_eq!(created["student_id"], student.id.to_string());
    assert!(created["complaint_id"].as_str().unwrap().starts_with("CMP-"));
    assert!(created.get("resolved_at").is_none());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn students_only_see_their_own_complaints() {
    let (app, _pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let alice = test_user(UserRole::Student, None);
    let bob = test_user(UserRole::Student, None);

    let mine = create_complaint_via_api(&app, &alice, dept, "other").await;
    create_complaint_via_api(&app, &bob, dept, "exam_mark").await;

    let (status, list) = get(&app, "/api/complaints", Some(&alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["complaints"][0]["id"], mine["id"]);

    let uri = format!("/api/complaints/{}", mine["id"].as_str().unwrap());
    let (status, _) = get(&app, &uri, Some(&bob.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn officer_search_is_scoped_to_department() {
    let (app, _pool, _guard) = test_app().await;
    let dept_a = Uuid::new_v4();
    let dept_b = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    create_complaint_via_api(&app, &student, dept_a, "other").await;
    create_complaint_via_api(&app, &student, dept_b, "other").await;

    let officer = test_user(UserRole::DepartmentOfficer, Some(dept_a));
    let (_, list) = get(&app, "/api/complaints", Some(&officer.token)).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["complaints"][0]["department_id"], dept_a.to_string());

    let admin = test_user(UserRole::Admin, None);
    let (_, list) = get(&app, "/api/complaints?category=other", Some(&admin.token)).await;
    assert_eq!(list["total"], 2);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn full_lifecycle_to_resolved() {
    let (app, _pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));
    let created = create_complaint_via_api(&app, &student, dept, "exam_mark").await;
    let uri = format!("/api/complaints/{}/status", created["id"].as_str().unwrap());

    let body = json!({ "status": "in_progress", "assigned_officer_id": officer.id });
    let (status, resp) = patch_json(&app, &uri, &body, Some(&officer.token)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(resp["status"], "in_progress");
    assert_eq!(resp["assigned_officer_id"], officer.id.to_string());

    let body = json!({ "status": "resolved", "response_message": "Script remarked, +6" });
    let (status, resp) = patch_json(&app, &uri, &body, Some(&officer.token)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(resp["status"], "resolved");
    assert_eq!(resp["response_message"], "Script remarked, +6");
    assert!(resp["resolved_at"].is_string());

    let body = json!({ "status": "pending", "response_message": "reopen" });
    let admin = test_user(UserRole::Admin, None);
    let (status, resp) = patch_json(&app, &uri, &body, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp["message"], "Invalid transition from resolved to pending");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn rejected_update_lists_every_failure() {
    let (app, _pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));
    let created = create_complaint_via_api(&app, &student, dept, "ca_mark").await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/complaints/{id}/status");

    let (status, resp) = patch_json(&app, &uri, &json!({ "status": "in_progress" }), Some(&officer.token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp["kind"], "ValidationError");
    assert_eq!(
        resp["field_errors"]["transition"],
        "An officer assignment is required to move a complaint to in_progress"
    );

    // Reject, then try to reopen as an officer without a response.
    let body = json!({ "status": "rejected", "response_message": "Outside the appeal window" });
    let (status, _) = patch_json(&app, &uri, &body, Some(&officer.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, resp) = patch_json(&app, &uri, &json!({ "status": "pending" }), Some(&officer.token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        resp["message"],
        "Role 'department_officer' is not permitted to move a complaint from rejected to pending; \
         A response message is required to move a complaint to pending"
    );

    // The complaint is unchanged.
    let (_, current) = get(&app, &format!("/api/complaints/{id}"), Some(&officer.token)).await;
    assert_eq!(current["status"], "rejected");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn admin_reopens_rejected_complaint() {
    let (app, _pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));
    let admin = test_user(UserRole::Admin, None);
    let created = create_complaint_via_api(&app, &student, dept, "other").await;
    let uri = format!("/api/complaints/{}/status", created["id"].as_str().unwrap());

    let body = json!({ "status": "rejected", "response_message": "Duplicate" });
    patch_json(&app, &uri, &body, Some(&officer.token)).await;

    let body = json!({
        "status": "in_progress",
        "response_message": "Not a duplicate after all",
        "assigned_officer_id": officer.id
    });
    let (status, resp) = patch_json(&app, &uri, &body, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(resp["status"], "in_progress");
    assert!(resp.get("resolved_at").is_none());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn complaint_transitions_follow_caller_role() {
    let (app, _pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));
    let created = create_complaint_via_api(&app, &student, dept, "other").await;
    let uri = format!("/api/complaints/{}/transitions", created["id"].as_str().unwrap());

    let (_, resp) = get(&app, &uri, Some(&student.token)).await;
    assert_eq!(resp["transitions"], json!([]));

    let (_, resp) = get(&app, &uri, Some(&officer.token)).await;
    assert_eq!(resp["from"], "pending");
    assert_eq!(resp["transitions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn overdue_complaint_deadline_and_batch_queries() {
    let (app, pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));

    let late = create_complaint_via_api(&app, &student, dept, "ca_mark").await;
    let late_id = late["id"].as_str().unwrap();
    backdate(&pool, late_id, 10).await;

    let soon = create_complaint_via_api(&app, &student, dept, "exam_mark").await;
    backdate(&pool, soon["id"].as_str().unwrap(), 13).await;

    create_complaint_via_api(&app, &student, dept, "other").await;

    let (_, deadline) = get(&app, &format!("/api/complaints/{late_id}/deadline"), Some(&student.token)).await;
    assert_eq!(deadline["is_overdue"], true);
    assert_eq!(deadline["days_remaining"], -3);

    let (status, overdue) = get(&app, "/api/complaints/overdue", Some(&officer.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overdue.as_array().unwrap().len(), 1);
    assert_eq!(overdue[0]["id"], late["id"]);

    let (_, approaching) = get(&app, "/api/complaints/approaching", Some(&officer.token)).await;
    assert_eq!(approaching.as_array().unwrap().len(), 1);
    assert_eq!(approaching[0]["id"], soon["id"]);

    // Officers of another department see none of it.
    let outsider = test_user(UserRole::DepartmentOfficer, Some(Uuid::new_v4()));
    let (_, overdue) = get(&app, "/api/complaints/overdue", Some(&outsider.token)).await;
    assert_eq!(overdue, json!([]));

    // Resolving clears the overdue flag.
    let uri = format!("/api/complaints/{late_id}/status");
    let body = json!({ "status": "in_progress", "assigned_officer_id": officer.id });
    patch_json(&app, &uri, &body, Some(&officer.token)).await;
    let body = json!({ "status": "resolved", "response_message": "Mark corrected" });
    patch_json(&app, &uri, &body, Some(&officer.token)).await;
    let (_, deadline) = get(&app, &format!("/api/complaints/{late_id}/deadline"), Some(&student.token)).await;
    assert_eq!(deadline["is_overdue"], false);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn statistics_count_by_status_category_and_overdue() {
    let (app, pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));
    let admin = test_user(UserRole::Admin, None);

    let a = create_complaint_via_api(&app, &student, dept, "ca_mark").await;
    backdate(&pool, a["id"].as_str().unwrap(), 8).await;
    create_complaint_via_api(&app, &student, dept, "ca_mark").await;
    let c = create_complaint_via_api(&app, &student, dept, "exam_mark").await;
    let body = json!({ "status": "rejected", "response_message": "Not eligible" });
    patch_json(
        &app,
        &format!("/api/complaints/{}/status", c["id"].as_str().unwrap()),
        &body,
        Some(&officer.token),
    )
    .await;

    let (status, stats) = get(&app, "/api/complaints/statistics", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "total": 3,
            "pending": 2,
            "in_progress": 0,
            "resolved": 0,
            "rejected": 1,
            "ca_mark": 2,
            "exam_mark": 1,
            "other": 0,
            "overdue": 1
        })
    );
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn status_change_notifies_the_student() {
    let (app, _pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));
    let created = create_complaint_via_api(&app, &student, dept, "other").await;

    let body = json!({ "status": "rejected", "response_message": "Submitted to wrong department" });
    patch_json(
        &app,
        &format!("/api/complaints/{}/status", created["id"].as_str().unwrap()),
        &body,
        Some(&officer.token),
    )
    .await;

    let (status, notes) = get(&app, "/api/notifications", Some(&student.token)).await;
    assert_eq!(status, StatusCode::OK);
    let notes = notes.as_array().unwrap().clone();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["kind"], "status_changed");
    assert_eq!(notes[0]["read"], false);
    assert!(notes[0]["message"].as_str().unwrap().ends_with("moved from pending to rejected"));

    let id = notes[0]["id"].as_str().unwrap();
    let (status, read) =
        patch_json(&app, &format!("/api/notifications/{id}/read"), &json!({}), Some(&student.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["read"], true);

    // Someone else cannot touch it.
    let other = test_user(UserRole::Student, None);
    let (status, _) =
        patch_json(&app, &format!("/api/notifications/{id}/read"), &json!({}), Some(&other.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, unread) = get(&app, "/api/notifications?unread_only=true", Some(&student.token)).await;
    assert_eq!(unread, json!([]));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn overdue_sweep_notifies_department_once_per_day() {
    let (app, pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));

    let late = create_complaint_via_api(&app, &student, dept, "ca_mark").await;
    backdate(&pool, late["id"].as_str().unwrap(), 10).await;
    create_complaint_via_api(&app, &student, dept, "exam_mark").await;

    let report = server::sweep::run_overdue_sweep(&pool, 2).await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.overdue, 1);
    assert_eq!(report.notified, 1);

    let again = server::sweep::run_overdue_sweep(&pool, 2).await.unwrap();
    assert_eq!(again.overdue, 1);
    assert_eq!(again.notified, 0);

    // Unassigned, so it is department-wide and the officer sees it.
    let (_, notes) = get(&app, "/api/notifications", Some(&officer.token)).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["kind"], "overdue");
    assert_eq!(notes[0]["complaint_id"], late["id"]);

    // Students never see department-wide notifications.
    let (_, notes) = get(&app, "/api/notifications", Some(&student.token)).await;
    assert_eq!(notes, json!([]));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn admin_can_file_on_behalf_of_a_student() {
    let (app, _pool, _guard) = test_app().await;
    let admin = test_user(UserRole::Admin, None);
    let student_id = Uuid::new_v4();
    let body = json!({
        "title": "Filed at the front desk",
        "description": "Paper form transcribed by admin",
        "category": "exam_mark",
        "department_id": Uuid::new_v4(),
        "student_id": student_id,
    });
    let (status, resp) = post_json(&app, "/api/complaints", &body, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["student_id"], student_id.to_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires TEST_DATABASE_URL"]
async fn concurrent_status_changes_apply_only_one() {
    let (app, pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let officer = test_user(UserRole::DepartmentOfficer, Some(dept));

    for _ in 0..20 {
        let created = create_complaint_via_api(&app, &student, dept, "ca_mark").await;
        let uri = format!("/api/complaints/{}/status", created["id"].as_str().unwrap());
        let body = json!({ "status": "in_progress", "assigned_officer_id": officer.id });
        let (status, _) = patch_json(&app, &uri, &body, Some(&officer.token)).await;
        assert_eq!(status, StatusCode::OK);

        let resolve = json!({ "status": "resolved", "response_message": "Mark corrected" });
        let requeue = json!({ "status": "pending" });
        let ((resolved, _), (requeued, _)) = tokio::join!(
            patch_json(&app, &uri, &resolve, Some(&officer.token)),
            patch_json(&app, &uri, &requeue, Some(&officer.token)),
        );

        let winners = [resolved, requeued].iter().filter(|s| **s == StatusCode::OK).count();
        assert_eq!(winners, 1, "resolve={resolved} requeue={requeued}");
        for loser in [resolved, requeued].into_iter().filter(|s| *s != StatusCode::OK) {
            assert!(
                loser == StatusCode::CONFLICT || loser == StatusCode::UNPROCESSABLE_ENTITY,
                "unexpected {loser}"
            );
        }

        let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();
        let stored = server::repo::complaint::find_by_id(&pool, id).await.unwrap().unwrap();
        let expected = if resolved == StatusCode::OK { "resolved" } else { "pending" };
        assert_eq!(stored.status, expected);
    }
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn stale_status_update_is_a_conflict() {
    let (app, pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let created = create_complaint_via_api(&app, &student, dept, "exam_mark").await;
    let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

    // Written as if it had been read while the complaint was still in progress.
    let row = server::repo::complaint::update_status(
        &pool,
        id,
        shared_types::ComplaintStatus::InProgress,
        shared_types::ComplaintStatus::Resolved,
        Some("done"),
        None,
    )
    .await
    .unwrap();
    assert!(row.is_none());

    let stored = server::repo::complaint::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.status, "pending");
    assert!(stored.resolved_at.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires TEST_DATABASE_URL"]
async fn concurrent_daily_enqueue_inserts_once() {
    let (app, pool, _guard) = test_app().await;
    let dept = Uuid::new_v4();
    let student = test_user(UserRole::Student, None);
    let created = create_complaint_via_api(&app, &student, dept, "ca_mark").await;
    let note = shared_types::NewNotification {
        recipient_id: None,
        department_id: dept,
        complaint_id: Uuid::parse_str(created["id"].as_str().unwrap()).unwrap(),
        kind: shared_types::NOTIFICATION_KIND_OVERDUE,
        message: "Complaint is overdue".to_string(),
    };

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let pool = pool.clone();
            let note = note.clone();
            tokio::spawn(async move { server::repo::notification::enqueue_daily(&pool, &note).await })
        })
        .collect();
    let mut inserted = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            inserted += 1;
        }
    }
    assert_eq!(inserted, 1);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE complaint_id = $1")
        .bind(note.complaint_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
