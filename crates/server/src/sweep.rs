//! Overdue sweep: batch deadline queries over open complaints.
//!
//! Partitioning is pure; [`run_overdue_sweep`] wraps it with the store reads
//! and the notification side effects.

use chrono::{DateTime, Utc};
use shared_types::{Complaint, NewNotification, NOTIFICATION_KIND_OVERDUE};

use crate::deadline;

/// Open complaints split by deadline state.
#[derive(Debug, Clone, Default)]
pub struct DeadlineBuckets {
    pub overdue: Vec<Complaint>,
    pub approaching: Vec<Complaint>,
}

/// Counts from one sweep pass, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub overdue: usize,
    pub approaching: usize,
    pub notified: u64,
}

/// Split complaints into overdue and approaching buckets.
///
/// Terminal complaints and complaints comfortably inside their window land in
/// neither. Rows with an unreadable status are skipped.
pub fn partition_deadlines(
    complaints: Vec<Complaint>,
    window_days: i64,
    now: DateTime<Utc>,
) -> DeadlineBuckets {
    let mut buckets = DeadlineBuckets::default();
    for complaint in complaints {
        let status = match complaint.status() {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "skipping complaint in deadline sweep");
                continue;
            }
        };
        let category = complaint.category();
        if deadline::is_overdue_at(complaint.submitted_at, category, status, now) {
            buckets.overdue.push(complaint);
        } else if deadline::is_approaching_deadline_at(
            complaint.submitted_at,
            category,
            status,
            window_days,
            now,
        ) {
            buckets.approaching.push(complaint);
        }
    }
    buckets
}

/// Notification for an overdue complaint. Goes to the assigned officer, or
/// to the whole department when nobody is assigned yet.
pub fn overdue_notification(complaint: &Complaint, now: DateTime<Utc>) -> NewNotification {
    let days_over = -deadline::days_until_deadline_at(complaint.submitted_at, complaint.category(), now);
    NewNotification {
        recipient_id: complaint.assigned_officer_id,
        department_id: complaint.department_id,
        complaint_id: complaint.id,
        kind: NOTIFICATION_KIND_OVERDUE,
        message: format!(
            "Complaint {} ({}) is {} day(s) past its deadline",
            complaint.complaint_id,
            complaint.category(),
            days_over.max(1)
        ),
    }
}

#[cfg(feature = "server")]
pub use store::*;

#[cfg(feature = "server")]
mod store {
    use super::*;
    use shared_types::{AppError, SweepConfig};
    use sqlx::{Pool, Postgres};

    /// Load open complaints and return the overdue ones.
    pub async fn overdue_complaints(pool: &Pool<Postgres>) -> Result<Vec<Complaint>, AppError> {
        let open = crate::repo::complaint::list_open(pool).await?;
        Ok(partition_deadlines(open, 0, Utc::now()).overdue)
    }

    /// Load open complaints and return those due within `window_days`.
    pub async fn approaching_complaints(
        pool: &Pool<Postgres>,
        window_days: i64,
    ) -> Result<Vec<Complaint>, AppError> {
        let open = crate::repo::complaint::list_open(pool).await?;
        Ok(partition_deadlines(open, window_days, Utc::now()).approaching)
    }

    /// One sweep pass: find overdue complaints and enqueue a reminder for
    /// each. A complaint is reminded at most once per day.
    #[tracing::instrument(skip(pool))]
    pub async fn run_overdue_sweep(
        pool: &Pool<Postgres>,
        window_days: i64,
    ) -> Result<SweepReport, AppError> {
        let now = Utc::now();
        let open = crate::repo::complaint::list_open(pool).await?;
        let scanned = open.len();
        let buckets = partition_deadlines(open, window_days, now);

        let mut notified = 0;
        for complaint in &buckets.overdue {
            let note = overdue_notification(complaint, now);
            if crate::repo::notification::enqueue_daily(pool, &note).await? {
                notified += 1;
            }
        }

        let report = SweepReport {
            scanned,
            overdue: buckets.overdue.len(),
            approaching: buckets.approaching.len(),
            notified,
        };
        tracing::info!(
            scanned = report.scanned,
            overdue = report.overdue,
            approaching = report.approaching,
            notified = report.notified,
            "overdue sweep finished"
        );
        Ok(report)
    }

    /// Run the sweep on an interval for the life of the process.
    pub fn spawn_sweep(pool: Pool<Postgres>, config: SweepConfig) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(config.interval_secs.max(1)));
            loop {
                interval.tick().await;
                if let Err(e) = run_overdue_sweep(&pool, config.approaching_window_days).await {
                    tracing::error!(error = %e, "overdue sweep failed");
                }
            }
        })
    }
}
