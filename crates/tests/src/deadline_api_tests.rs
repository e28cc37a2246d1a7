use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{post_json, test_app_no_db};

#[tokio::test]
async fn fixed_window_per_category() {
    let app = test_app_no_db();
    for (category, days, due) in [
        ("ca_mark", 7, "2025-03-08T09:00:00+00:00"),
        ("exam_mark", 14, "2025-03-15T09:00:00+00:00"),
        ("other", 10, "2025-03-11T09:00:00+00:00"),
    ] {
        let body = json!({ "submitted_at": "2025-03-01T09:00:00Z", "category": category });
        let (status, resp) = post_json(&app, "/api/deadlines/calculate", &body, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["category"], category);
        assert_eq!(resp["window_days"], days);
        assert_eq!(resp["due_at"], due);
        assert!(resp.get("is_overdue").is_none());
    }
}

#[tokio::test]
async fn unknown_category_uses_other_window() {
    let app = test_app_no_db();
    let body = json!({ "submitted_at": "2025-03-01T09:00:00Z", "category": "timetable" });
    let (status, resp) = post_json(&app, "/api/deadlines/calculate", &body, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["category"], "other");
    assert_eq!(resp["window_days"], 10);
}

#[tokio::test]
async fn ten_day_old_ca_mark_is_three_days_overdue() {
    let app = test_app_no_db();
    let submitted: DateTime<Utc> = Utc::now() - Duration::days(10);

    let body = json!({ "submitted_at": submitted, "category": "ca_mark", "status": "pending" });
    let (_, resp) = post_json(&app, "/api/deadlines/calculate", &body, None).await;
    assert_eq!(resp["is_overdue"], true);
    assert_eq!(resp["days_remaining"], -3);

    let body = json!({ "submitted_at": submitted, "category": "ca_mark", "status": "resolved" });
    let (_, resp) = post_json(&app, "/api/deadlines/calculate", &body, None).await;
    assert_eq!(resp["is_overdue"], false);
    assert_eq!(resp["days_remaining"], -3);
}

#[tokio::test]
async fn fresh_complaint_has_full_window() {
    let app = test_app_no_db();
    let body = json!({ "submitted_at": Utc::now(), "category": "exam_mark", "status": "in_progress" });
    let (_, resp) = post_json(&app, "/api/deadlines/calculate", &body, None).await;
    assert_eq!(resp["is_overdue"], false);
    assert_eq!(resp["days_remaining"], 14);
}

#[tokio::test]
async fn unknown_status_is_bad_request() {
    let app = test_app_no_db();
    let body = json!({ "submitted_at": "2025-03-01T09:00:00Z", "category": "ca_mark", "status": "closed" });
    let (status, resp) = post_json(&app, "/api/deadlines/calculate", &body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["kind"], "BadRequest");
}
