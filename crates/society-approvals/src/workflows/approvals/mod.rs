//! Multi-stage approval of society registrations, renewals, and event permits.
//!
//! Each application kind follows a fixed [`StagePlan`]; the service validates
//! a decision against the current stage, commits it together with any society
//! registry change, then notifies and audits on a best-effort basis.

pub mod audit;
pub mod domain;
pub(crate) mod engine;
pub mod error;
pub mod memory;
pub(crate) mod migration;
pub mod notifier;
pub mod queue;
pub mod registry;
pub mod router;
pub mod service;
pub mod stages;

#[cfg(test)]
mod tests;

pub use audit::{AuditAction, AuditEntry, AuditError, AuditFilter, AuditLog};
pub use domain::{
    normalize_faculty, AdvisoryBoardMember, Applicant, Application, ApplicationId,
    ApplicationKind, ApplicationPayload, ApplicationRef, ApplicationSummary, ApprovalStatus, Approver,
    ApproverRole, BankDetails, Decision, EventDetails, EventPermissionSubmission, Official,
    Officers, PremisesOfficer, RegistrationDetails, RegistrationSubmission, RenewalDetails,
    RenewalSubmission, SeniorTreasurer, Society, SocietyActivity, SocietyFilter, SocietyId,
    SocietyStatus, StageStamps,
};
pub use error::WorkflowError;
pub use memory::{InMemoryAuditLog, InMemoryRegistry, RecordingNotifier};
pub use notifier::{Notification, NotificationTemplate, Notifier, NotifyError, Recipient};
pub use queue::{DashboardStats, PendingWorkQuery};
pub use registry::{Committed, Registry, RegistryError};
pub use router::approval_router;
pub use service::{ApprovalWorkflowService, DecisionOutcome};
pub use stages::{EventPermissionFlow, Stage, StagePlan};
