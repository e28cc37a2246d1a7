use axum::Router;
use shared_types::{
    AppError, AppErrorKind, AvailableTransitionsResponse, CalculateDeadlineRequest,
    CalculateDeadlineResponse, ComplaintCategory, ComplaintResponse, ComplaintSearchResponse,
    ComplaintStatistics, ComplaintStatus, CreateComplaintRequest, DeadlineSummary,
    NotificationResponse, TransitionOption, TransitionValidation, UpdateComplaintStatusRequest,
    UserRole, ValidateTransitionRequest,
};
use sqlx::{Pool, Postgres};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable};

use crate::db::AppState;
use crate::health;
use crate::rest;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation for the API.
#[derive(OpenApi)]
#[openapi(
    paths(
        rest::complaint::create_complaint,
        rest::complaint::search_complaints,
        rest::complaint::get_complaint,
        rest::complaint::update_complaint_status,
        rest::complaint::complaint_transitions,
        rest::complaint::complaint_deadline,
        rest::complaint::list_overdue,
        rest::complaint::list_approaching,
        rest::complaint::complaint_statistics,
        rest::workflow::validate_transition,
        rest::workflow::list_transitions,
        rest::workflow::calculate_deadline,
        rest::notification::list_notifications,
        rest::notification::mark_notification_read,
        health::health_check,
    ),
    components(schemas(
        AppError,
        AppErrorKind,
        UserRole,
        ComplaintStatus,
        ComplaintCategory,
        ComplaintResponse,
        ComplaintSearchResponse,
        ComplaintStatistics,
        CreateComplaintRequest,
        UpdateComplaintStatusRequest,
        DeadlineSummary,
        CalculateDeadlineRequest,
        CalculateDeadlineResponse,
        TransitionValidation,
        TransitionOption,
        ValidateTransitionRequest,
        AvailableTransitionsResponse,
        NotificationResponse,
        health::HealthResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "complaints", description = "Complaint submission, lookup and status workflow"),
        (name = "workflow", description = "Transition rules and validation"),
        (name = "deadlines", description = "Deadline calculation"),
        (name = "notifications", description = "Overdue and status-change notifications"),
        (name = "health", description = "Health check endpoint")
    ),
    info(
        title = "Complaint Tracker API",
        description = "University academic complaint workflow and deadline tracking",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Build an Axum router that serves the API docs at `/docs`
/// and the REST API at `/api/*`.
pub fn api_router(pool: Pool<Postgres>) -> Router {
    let state = AppState { pool };

    Router::new()
        .merge(rest::api_router())
        .route("/health", axum::routing::get(health::health_check))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
}

/// The full service: API routes plus auth, request-id and (when the
/// `telemetry` flag is on) tracing layers.
pub fn app_router(pool: Pool<Postgres>) -> Router {
    let mut router = api_router(pool);

    if crate::config::feature_flags().telemetry {
        router = router.layer(crate::telemetry::OtelTraceLayer);
    }

    router
        .layer(axum::middleware::from_fn(crate::auth::middleware::auth_middleware))
        .layer(tower_http::request_id::PropagateRequestIdLayer::x_request_id())
        .layer(tower_http::request_id::SetRequestIdLayer::x_request_id(
            tower_http::request_id::MakeRequestUuid,
        ))
}
