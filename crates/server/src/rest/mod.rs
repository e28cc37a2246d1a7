pub mod complaint;
pub mod notification;
pub mod workflow;

use axum::{routing::{get, patch, post}, Router};
use crate::db::AppState;

/// Build the REST API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Complaints
        .route("/api/complaints", get(complaint::search_complaints).post(complaint::create_complaint))
        .route("/api/complaints/overdue", get(complaint::list_overdue))
        .route("/api/complaints/approaching", get(complaint::list_approaching))
        .route("/api/complaints/statistics", get(complaint::complaint_statistics))
        .route("/api/complaints/{id}", get(complaint::get_complaint))
        .route("/api/complaints/{id}/status", patch(complaint::update_complaint_status))
        .route("/api/complaints/{id}/transitions", get(complaint::complaint_transitions))
        .route("/api/complaints/{id}/deadline", get(complaint::complaint_deadline))
        // Workflow and deadline calculators (no database access)
        .route("/api/workflow/validate", post(workflow::validate_transition))
        .route("/api/workflow/transitions", get(workflow::list_transitions))
        .route("/api/deadlines/calculate", post(workflow::calculate_deadline))
        // Notifications
        .route("/api/notifications", get(notification::list_notifications))
        .route("/api/notifications/{id}/read", patch(notification::mark_notification_read))
}
