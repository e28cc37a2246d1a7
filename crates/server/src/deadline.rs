//! Complaint deadline calculator.
//!
//! A complaint's deadline is its submission time plus a fixed number of days
//! keyed by category. Functions that depend on the current time come in two
//! forms: an `_at` variant taking an explicit `now`, and a convenience
//! wrapper reading `Utc::now()`.

use chrono::{DateTime, Duration, Utc};
use shared_types::{AppError, Complaint, ComplaintCategory, ComplaintStatus, DeadlineSummary};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Due date for a complaint. Saturates at the maximum representable time.
pub fn calculate_deadline(submitted_at: DateTime<Utc>, category: ComplaintCategory) -> DateTime<Utc> {
    submitted_at
        .checked_add_signed(Duration::days(category.deadline_days()))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn is_overdue(
    submitted_at: DateTime<Utc>,
    category: ComplaintCategory,
    status: ComplaintStatus,
) -> bool {
    is_overdue_at(submitted_at, category, status, Utc::now())
}

/// Terminal complaints are never overdue.
pub fn is_overdue_at(
    submitted_at: DateTime<Utc>,
    category: ComplaintCategory,
    status: ComplaintStatus,
    now: DateTime<Utc>,
) -> bool {
    if status.is_terminal() {
        return false;
    }
    now > calculate_deadline(submitted_at, category)
}

pub fn days_until_deadline(submitted_at: DateTime<Utc>, category: ComplaintCategory) -> i64 {
    days_until_deadline_at(submitted_at, category, Utc::now())
}

/// Ceiling of the time left until the deadline, in days.
///
/// Negative values count days overdue. The first partial day past the
/// deadline reports -1 rather than 0, so the sign always agrees with
/// [`is_overdue_at`] for open complaints.
pub fn days_until_deadline_at(
    submitted_at: DateTime<Utc>,
    category: ComplaintCategory,
    now: DateTime<Utc>,
) -> i64 {
    let remaining = calculate_deadline(submitted_at, category).signed_duration_since(now);
    let millis = remaining.num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY) + i64::from(millis.rem_euclid(MILLIS_PER_DAY) != 0);
    if days == 0 && millis < 0 {
        -1
    } else {
        days
    }
}

/// Open, not yet overdue, and due within `window_days`.
pub fn is_approaching_deadline_at(
    submitted_at: DateTime<Utc>,
    category: ComplaintCategory,
    status: ComplaintStatus,
    window_days: i64,
    now: DateTime<Utc>,
) -> bool {
    if status.is_terminal() || is_overdue_at(submitted_at, category, status, now) {
        return false;
    }
    days_until_deadline_at(submitted_at, category, now) <= window_days
}

pub fn deadline_summary_at(
    submitted_at: DateTime<Utc>,
    category: ComplaintCategory,
    status: ComplaintStatus,
    window_days: i64,
    now: DateTime<Utc>,
) -> DeadlineSummary {
    DeadlineSummary {
        due_at: calculate_deadline(submitted_at, category),
        days_remaining: days_until_deadline_at(submitted_at, category, now),
        is_overdue: is_overdue_at(submitted_at, category, status, now),
        is_approaching: is_approaching_deadline_at(submitted_at, category, status, window_days, now),
    }
}

/// Deadline summary for a stored complaint.
pub fn complaint_summary_at(
    complaint: &Complaint,
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<DeadlineSummary, AppError> {
    Ok(deadline_summary_at(
        complaint.submitted_at,
        complaint.category(),
        complaint.status()?,
        window_days,
        now,
    ))
}
