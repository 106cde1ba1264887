use super::domain::{ApplicationId, ApplicationKind, ApprovalStatus, ApproverRole, SocietyId};
use super::registry::RegistryError;

/// Typed failures surfaced by the approval workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("{kind} application {id} not found")]
    NotFound {
        kind: ApplicationKind,
        id: ApplicationId,
    },
    #[error("{kind} application {id} is already finalized ({status})")]
    AlreadyFinalized {
        kind: ApplicationKind,
        id: ApplicationId,
        status: ApprovalStatus,
    },
    #[error("{kind} application {id} is not awaiting a decision at this stage (now {status})")]
    StageMismatch {
        kind: ApplicationKind,
        id: ApplicationId,
        status: ApprovalStatus,
    },
    #[error("{status} requires a {required} decision; caller is {actual}")]
    UnauthorizedRole {
        required: ApproverRole,
        actual: ApproverRole,
        status: ApprovalStatus,
    },
    #[error("approver faculty {approver:?} does not match application faculty {application:?}")]
    ScopeMismatch {
        approver: Option<String>,
        application: Option<String>,
    },
    #[error("{role} queries require a faculty scope")]
    MissingScope { role: ApproverRole },
    #[error("invalid decision: {0}")]
    InvalidDecision(String),
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
    #[error("a society named '{0}' already exists or is awaiting registration")]
    DuplicateSociety(String),
    #[error("no active society named '{0}' is registered")]
    SocietyNotFound(String),
    #[error("society {0} not found")]
    UnknownSociety(SocietyId),
    #[error("a renewal for '{society}' has already been submitted for {year}")]
    DuplicateRenewal { society: String, year: i32 },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl WorkflowError {
    /// Stable machine-readable code for API clients.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::UnknownSociety(_) => "not_found",
            Self::AlreadyFinalized { .. } => "already_finalized",
            Self::StageMismatch { .. } => "stage_mismatch",
            Self::UnauthorizedRole { .. } => "unauthorized_role",
            Self::ScopeMismatch { .. } => "scope_mismatch",
            Self::MissingScope { .. } => "missing_scope",
            Self::InvalidDecision(_) => "invalid_decision",
            Self::InvalidSubmission(_) => "invalid_submission",
            Self::DuplicateSociety(_) => "duplicate_society",
            Self::SocietyNotFound(_) => "society_not_found",
            Self::DuplicateRenewal { .. } => "duplicate_renewal",
            Self::Registry(RegistryError::Conflict) => "conflict",
            Self::Registry(_) => "registry_unavailable",
        }
    }
}
