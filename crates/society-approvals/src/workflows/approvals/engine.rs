//! Pure state-machine step: authorise a decision and compute the next state.
//! Persistence and side effects live in the service.

use chrono::{DateTime, Utc};

use super::domain::{normalize_faculty, Application, ApprovalStatus, Approver, Decision};
use super::error::WorkflowError;
use super::stages::StagePlan;

/// Validate `decision` against `application`'s current stage and apply it.
///
/// Checks run in a fixed order: terminal state, stage membership, role,
/// Dean scope, then the rejection reason.
pub(crate) fn apply_decision(
    plan: &StagePlan,
    mut application: Application,
    approver: &Approver,
    decision: Decision,
    rejection_reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Application, WorkflowError> {
    let status = application.status;
    if status.is_terminal() {
        return Err(WorkflowError::AlreadyFinalized {
            kind: application.kind(),
            id: application.id,
            status,
        });
    }

    let stage = plan
        .stage_for(status)
        .ok_or(WorkflowError::StageMismatch {
            kind: application.kind(),
            id: application.id,
            status,
        })?;

    if approver.role != stage.role {
        return Err(WorkflowError::UnauthorizedRole {
            required: stage.role,
            actual: approver.role,
            status,
        });
    }

    if stage.role.is_faculty_scoped() {
        ensure_scope(approver, &application)?;
    }

    match decision {
        Decision::Reject => {
            let reason = rejection_reason
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .ok_or_else(|| {
                    WorkflowError::InvalidDecision("a rejection reason is required".to_string())
                })?;
            application.status = ApprovalStatus::Rejected;
            application.rejection_reason = Some(reason.to_string());
        }
        Decision::Approve => {
            let next = plan.advance(status).ok_or(WorkflowError::StageMismatch {
                kind: application.kind(),
                id: application.id,
                status,
            })?;
            application.stamps.stamp(stage.role, now);
            application.status = next;
            if next == ApprovalStatus::Approved {
                application.approved_at = Some(now);
            }
        }
    }

    Ok(application)
}

fn ensure_scope(approver: &Approver, application: &Application) -> Result<(), WorkflowError> {
    let approver_faculty = normalize_faculty(approver.faculty.as_deref());
    let application_faculty = normalize_faculty(application.faculty());
    match (approver_faculty, application_faculty) {
        (Some(mine), Some(theirs)) if mine == theirs => Ok(()),
        _ => Err(WorkflowError::ScopeMismatch {
            approver: approver.faculty.clone(),
            application: application.applicant.faculty.clone(),
        }),
    }
}
