//! Complaint status workflow.
//!
//! A static transition table over the four complaint states, gated by actor
//! role and by whether the request carries a response message and an
//! officer assignment. Everything here is pure; callers reject the database
//! update when a validation comes back invalid.
//!
//! ```text
//! pending ──► in_progress ──► resolved (terminal)
//!    │   ◄────────┘  │
//!    ▼               ▼
//! rejected ◄─────────┘      rejected ──► pending | in_progress  (admin only)
//! ```

use shared_types::{ComplaintStatus, TransitionOption, TransitionValidation, UserRole};

/// One permitted edge of the workflow and what it demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: ComplaintStatus,
    pub to: ComplaintStatus,
    pub allowed_roles: &'static [UserRole],
    pub requires_response: bool,
    pub requires_assignment: bool,
}

impl TransitionRule {
    pub fn permits(&self, role: UserRole) -> bool {
        self.allowed_roles.contains(&role)
    }

    fn option(&self) -> TransitionOption {
        TransitionOption {
            to: self.to,
            requires_response: self.requires_response,
            requires_assignment: self.requires_assignment,
        }
    }
}

const STAFF: &[UserRole] = &[UserRole::DepartmentOfficer, UserRole::Admin];
const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Every legal edge, grouped by source state. `resolved` has no outgoing edges.
pub const TRANSITION_RULES: &[TransitionRule] = &[
    TransitionRule {
        from: ComplaintStatus::Pending,
        to: ComplaintStatus::InProgress,
        allowed_roles: STAFF,
        requires_response: false,
        requires_assignment: true,
    },
    TransitionRule {
        from: ComplaintStatus::Pending,
        to: ComplaintStatus::Rejected,
        allowed_roles: STAFF,
        requires_response: true,
        requires_assignment: false,
    },
    TransitionRule {
        from: ComplaintStatus::InProgress,
        to: ComplaintStatus::Resolved,
        allowed_roles: STAFF,
        requires_response: true,
        requires_assignment: false,
    },
    TransitionRule {
        from: ComplaintStatus::InProgress,
        to: ComplaintStatus::Rejected,
        allowed_roles: STAFF,
        requires_response: true,
        requires_assignment: false,
    },
    TransitionRule {
        from: ComplaintStatus::InProgress,
        to: ComplaintStatus::Pending,
        allowed_roles: STAFF,
        requires_response: false,
        requires_assignment: false,
    },
    // Reopening: response and assignment demands differ between the two
    // targets. Kept as given policy.
    TransitionRule {
        from: ComplaintStatus::Rejected,
        to: ComplaintStatus::Pending,
        allowed_roles: ADMIN_ONLY,
        requires_response: true,
        requires_assignment: false,
    },
    TransitionRule {
        from: ComplaintStatus::Rejected,
        to: ComplaintStatus::InProgress,
        allowed_roles: ADMIN_ONLY,
        requires_response: true,
        requires_assignment: true,
    },
];

/// Look up the rule for an edge, if the edge exists.
pub fn transition_rule(from: ComplaintStatus, to: ComplaintStatus) -> Option<&'static TransitionRule> {
    TRANSITION_RULES.iter().find(|r| r.from == from && r.to == to)
}

/// Whether the edge exists at all, regardless of role or inputs.
pub fn is_valid_transition(from: ComplaintStatus, to: ComplaintStatus) -> bool {
    transition_rule(from, to).is_some()
}

/// Check a requested status change.
///
/// Permission, response and assignment checks are all evaluated and each
/// failure contributes its own error. A non-existent edge reports only that,
/// since there is no rule to check the rest against.
pub fn validate_transition(
    from: ComplaintStatus,
    to: ComplaintStatus,
    role: UserRole,
    has_response: bool,
    has_assignment: bool,
) -> TransitionValidation {
    let Some(rule) = transition_rule(from, to) else {
        tracing::debug!(%from, %to, "rejected transition: no such edge");
        return TransitionValidation::from_errors(vec![format!(
            "Invalid transition from {from} to {to}"
        )]);
    };

    let mut errors = Vec::new();

    if !rule.permits(role) {
        errors.push(format!(
            "Role '{}' is not permitted to move a complaint from {from} to {to}",
            role.as_str()
        ));
    }

    if rule.requires_response && !has_response {
        errors.push(format!(
            "A response message is required to move a complaint to {to}"
        ));
    }

    if rule.requires_assignment && !has_assignment {
        errors.push(format!(
            "An officer assignment is required to move a complaint to {to}"
        ));
    }

    if !errors.is_empty() {
        tracing::debug!(%from, %to, role = role.as_str(), ?errors, "rejected transition");
    }

    TransitionValidation::from_errors(errors)
}

/// Same as [`validate_transition`] but over raw strings as they arrive from
/// forms and the database. Unknown statuses become validation errors; an
/// unknown role is treated as a student.
pub fn validate_transition_str(
    from: &str,
    to: &str,
    role: &str,
    has_response: bool,
    has_assignment: bool,
) -> TransitionValidation {
    let parsed_from = ComplaintStatus::parse(from);
    let parsed_to = ComplaintStatus::parse(to);

    match (parsed_from, parsed_to) {
        (Some(f), Some(t)) => validate_transition(
            f,
            t,
            UserRole::from_str_or_default(role),
            has_response,
            has_assignment,
        ),
        _ => {
            let mut errors = Vec::new();
            if parsed_from.is_none() {
                errors.push(format!("Unknown status '{from}'"));
            }
            if parsed_to.is_none() {
                errors.push(format!("Unknown status '{to}'"));
            }
            TransitionValidation::from_errors(errors)
        }
    }
}

/// Statuses `role` may move a complaint to from `from`, in table order.
pub fn available_transitions(from: ComplaintStatus, role: UserRole) -> Vec<ComplaintStatus> {
    rules_for(from, role).map(|r| r.to).collect()
}

/// Like [`available_transitions`], with each edge's input requirements.
pub fn transition_options(from: ComplaintStatus, role: UserRole) -> Vec<TransitionOption> {
    rules_for(from, role).map(TransitionRule::option).collect()
}

fn rules_for(from: ComplaintStatus, role: UserRole) -> impl Iterator<Item = &'static TransitionRule> {
    TRANSITION_RULES
        .iter()
        .filter(move |r| r.from == from && r.permits(role))
}
