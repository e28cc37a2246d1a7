use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use server::{deadline, sweep, workflow};
use shared_types::{Complaint, ComplaintCategory, ComplaintStatus, UserRole};
use uuid::Uuid;

fn complaint(category: &str, status: &str, days_old: i64) -> Complaint {
    let now = Utc.with_ymd_and_hms(2025, 5, 12, 10, 0, 0).unwrap();
    let submitted_at = now - Duration::days(days_old);
    Complaint {
        id: Uuid::new_v4(),
        complaint_id: "CMP-20250501-ABC123".into(),
        category: category.into(),
        status: status.into(),
        title: "Quiz mark".into(),
        description: "Quiz mark missing".into(),
        student_id: Uuid::new_v4(),
        department_id: Uuid::new_v4(),
        assigned_officer_id: None,
        response_message: None,
        submitted_at,
        updated_at: submitted_at,
        resolved_at: None,
    }
}

#[test]
fn officer_works_an_overdue_complaint_to_resolution() {
    let now = Utc.with_ymd_and_hms(2025, 5, 12, 10, 0, 0).unwrap();
    let mut c = complaint("ca_mark", "pending", 10);

    let summary = deadline::complaint_summary_at(&c, 2, now).unwrap();
    assert!(summary.is_overdue);
    assert_eq!(summary.days_remaining, -3);
    assert!(!summary.is_approaching);

    let officer = UserRole::DepartmentOfficer;
    let from = c.status().unwrap();
    assert!(!workflow::validate_transition(from, ComplaintStatus::InProgress, officer, false, false).valid);
    assert!(workflow::validate_transition(from, ComplaintStatus::InProgress, officer, false, true).valid);
    c.status = "in_progress".into();

    let check = workflow::validate_transition(c.status().unwrap(), ComplaintStatus::Resolved, officer, true, true);
    assert!(check.valid);
    c.status = "resolved".into();

    let summary = deadline::complaint_summary_at(&c, 2, now).unwrap();
    assert!(!summary.is_overdue);
    assert_eq!(summary.due_at, c.submitted_at + Duration::days(ComplaintCategory::CaMark.deadline_days()));
}

#[test]
fn sweep_buckets_match_per_complaint_checks() {
    let now = Utc.with_ymd_and_hms(2025, 5, 12, 10, 0, 0).unwrap();
    let rows = vec![
        complaint("ca_mark", "pending", 10),
        complaint("ca_mark", "in_progress", 6),
        complaint("exam_mark", "pending", 3),
        complaint("other", "rejected", 40),
    ];
    let expected_overdue = rows
        .iter()
        .filter(|c| deadline::is_overdue_at(c.submitted_at, c.category(), c.status().unwrap(), now))
        .count();

    let buckets = sweep::partition_deadlines(rows, 2, now);
    assert_eq!(buckets.overdue.len(), expected_overdue);
    assert_eq!(buckets.overdue.len(), 1);
    assert_eq!(buckets.approaching.len(), 1);
    assert_eq!(buckets.approaching[0].status, "in_progress");
}
