use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::WorkflowConfig;

use super::audit::{AuditAction, AuditEntry, AuditFilter, AuditLog};
use super::domain::{
    normalize_faculty, Applicant, Application, ApplicationId, ApplicationKind,
    ApplicationPayload, ApplicationRef, ApplicationSummary, ApprovalStatus, Approver,
    ApproverRole, Decision, EventPermissionSubmission, RegistrationSubmission,
    RenewalSubmission, Society, SocietyFilter, SocietyId, SocietyStatus, StageStamps,
};
use super::engine::apply_decision;
use super::error::WorkflowError;
use super::migration;
use super::notifier::{Notification, NotificationTemplate, Notifier, Recipient};
use super::queue::{DashboardStats, PendingWorkQuery};
use super::registry::{Registry, RegistryError};
use super::stages::StagePlan;

/// Outcome of a committed decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionOutcome {
    pub application: Application,
    /// Society created or updated by a final approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub society: Option<Society>,
}

/// Service composing the registry, notifier, audit log, and stage plans.
pub struct ApprovalWorkflowService<R, N, A> {
    registry: Arc<R>,
    notifier: Arc<N>,
    audit: Arc<A>,
    config: WorkflowConfig,
    queries: PendingWorkQuery<R>,
}

impl<R, N, A> ApprovalWorkflowService<R, N, A>
where
    R: Registry + 'static,
    N: Notifier + 'static,
    A: AuditLog + 'static,
{
    pub fn new(registry: Arc<R>, notifier: Arc<N>, audit: Arc<A>, config: WorkflowConfig) -> Self {
        let queries = PendingWorkQuery::new(registry.clone(), config.event_permission_flow);
        Self {
            registry,
            notifier,
            audit,
            config,
            queries,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn plan(&self, kind: ApplicationKind) -> StagePlan {
        StagePlan::for_kind(kind, self.config.event_permission_flow)
    }

    /// File a new society registration; it starts at the Dean stage.
    pub fn submit_registration(
        &self,
        submission: RegistrationSubmission,
    ) -> Result<Application, WorkflowError> {
        let RegistrationSubmission { applicant, details } = submission;
        require("society name", &details.society_name)?;
        require_faculty(&applicant)?;

        let name = details.society_name.trim().to_string();
        if self.registry.find_society_by_name(&name)?.is_some() {
            return Err(WorkflowError::DuplicateSociety(name));
        }
        let in_flight = self
            .registry
            .find_all(ApplicationKind::Registration)?
            .into_iter()
            .any(|existing| {
                existing.status != ApprovalStatus::Rejected
                    && existing.payload.society_name() == name
            });
        if in_flight {
            return Err(WorkflowError::DuplicateSociety(name));
        }

        let mut details = details;
        details.society_name = name;
        self.file(applicant, ApplicationPayload::Registration(details))
    }

    /// File the annual renewal for an active society.
    pub fn submit_renewal(
        &self,
        submission: RenewalSubmission,
    ) -> Result<Application, WorkflowError> {
        let RenewalSubmission { applicant, details } = submission;
        require("society name", &details.society_name)?;
        require_faculty(&applicant)?;

        let name = details.society_name.trim().to_string();
        let society = self
            .registry
            .find_society_by_name(&name)?
            .filter(|society| society.status == SocietyStatus::Active)
            .ok_or_else(|| WorkflowError::SocietyNotFound(name.clone()))?;

        let year = Utc::now().year();
        let already_filed = self
            .registry
            .find_all(ApplicationKind::Renewal)?
            .into_iter()
            .any(|existing| {
                existing.year == year
                    && existing.status != ApprovalStatus::Rejected
                    && existing.payload.society_name() == society.name
            });
        if already_filed {
            return Err(WorkflowError::DuplicateRenewal {
                society: society.name,
                year,
            });
        }

        let mut details = details;
        details.society_name = name;
        self.file(applicant, ApplicationPayload::Renewal(details))
    }

    /// File a one-off event permission request.
    pub fn submit_event_permission(
        &self,
        submission: EventPermissionSubmission,
    ) -> Result<Application, WorkflowError> {
        let EventPermissionSubmission { applicant, details } = submission;
        require("society name", &details.society_name)?;
        require("event name", &details.event_name)?;
        if details.time_to <= details.time_from {
            return Err(WorkflowError::InvalidSubmission(
                "event must end after it starts".to_string(),
            ));
        }
        self.file(applicant, ApplicationPayload::EventPermission(details))
    }

    /// Approve or reject the application at its current stage.
    ///
    /// The status change and any registry migration are committed together;
    /// notification and audit failures are logged and never undo the decision.
    pub fn decide(
        &self,
        target: ApplicationRef,
        approver: &Approver,
        decision: Decision,
        rejection_reason: Option<&str>,
    ) -> Result<DecisionOutcome, WorkflowError> {
        let current = self.load(target)?;
        let previous = current.status;
        let read_version = current.version;
        let now = Utc::now();

        let decided = apply_decision(
            &self.plan(target.kind),
            current,
            approver,
            decision,
            rejection_reason,
            now,
        )?;
        let society = if decided.status == ApprovalStatus::Approved {
            migration::prepare(self.registry.as_ref(), &decided, now)?
        } else {
            None
        };

        let committed = match self.registry.commit(decided, society) {
            Ok(committed) => committed,
            Err(RegistryError::Conflict) => {
                return Err(self.lost_race(target, previous, read_version))
            }
            Err(RegistryError::DuplicateSocietyName(name)) => {
                return Err(WorkflowError::DuplicateSociety(name))
            }
            Err(RegistryError::UnknownSociety(name)) => {
                return Err(WorkflowError::SocietyNotFound(name))
            }
            Err(RegistryError::NotFound) => {
                return Err(WorkflowError::NotFound {
                    kind: target.kind,
                    id: target.id,
                })
            }
            Err(other) => return Err(other.into()),
        };

        let application = committed.application;
        info!(
            kind = %target.kind,
            id = %target.id,
            from = %previous,
            to = %application.status,
            actor = %approver.name,
            role = %approver.role,
            "decision committed"
        );
        if let Some(society) = &committed.society {
            info!(society = %society.name, society_id = society.id.0, "society registry updated");
        }

        self.announce_decision(&application, previous, approver, now);

        Ok(DecisionOutcome {
            application,
            society: committed.society,
        })
    }

    /// Fetch one application with its full payload.
    pub fn get(&self, target: ApplicationRef) -> Result<Application, WorkflowError> {
        self.load(target)
    }

    pub fn pending_for(
        &self,
        role: ApproverRole,
        scope: Option<&str>,
    ) -> Result<Vec<ApplicationSummary>, WorkflowError> {
        self.queries.pending_for(role, scope)
    }

    pub fn dashboard(
        &self,
        role: ApproverRole,
        scope: Option<&str>,
        year: i32,
    ) -> Result<DashboardStats, WorkflowError> {
        self.queries.dashboard(role, scope, year)
    }

    /// Registered societies matching `filter`, in registration order.
    pub fn societies(&self, filter: &SocietyFilter) -> Result<Vec<Society>, WorkflowError> {
        Ok(self
            .registry
            .societies()?
            .into_iter()
            .filter(|society| filter.matches(society))
            .collect())
    }

    pub fn society(&self, id: SocietyId) -> Result<Society, WorkflowError> {
        self.registry
            .find_society(id)?
            .ok_or(WorkflowError::UnknownSociety(id))
    }

    /// Audit records matching `filter`, newest first. An unreachable audit
    /// store yields an empty list.
    pub fn activity(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        match self.audit.entries(filter) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, "audit log read failed");
                Vec::new()
            }
        }
    }

    fn load(&self, target: ApplicationRef) -> Result<Application, WorkflowError> {
        self.registry
            .get(target.kind, target.id)?
            .ok_or(WorkflowError::NotFound {
                kind: target.kind,
                id: target.id,
            })
    }

    /// A concurrent write committed first; report where it left the record.
    ///
    /// When the application itself is unchanged the conflict came from the
    /// society record, and the caller may simply retry.
    fn lost_race(
        &self,
        target: ApplicationRef,
        previous: ApprovalStatus,
        read_version: u32,
    ) -> WorkflowError {
        let latest = match self.load(target) {
            Ok(latest) => latest,
            Err(error) => return error,
        };
        if latest.version == read_version {
            warn!(kind = %target.kind, id = %target.id, "society record changed during decision");
            return WorkflowError::Registry(RegistryError::Conflict);
        }
        let status = latest.status;
        warn!(kind = %target.kind, id = %target.id, from = %previous, now = %status, "concurrent decision lost");
        if status.is_terminal() {
            WorkflowError::AlreadyFinalized {
                kind: target.kind,
                id: target.id,
                status,
            }
        } else {
            WorkflowError::StageMismatch {
                kind: target.kind,
                id: target.id,
                status,
            }
        }
    }

    fn file(
        &self,
        mut applicant: Applicant,
        payload: ApplicationPayload,
    ) -> Result<Application, WorkflowError> {
        applicant.faculty = normalize_faculty(applicant.faculty.as_deref()).map(str::to_string);
        let now = Utc::now();
        let kind = payload.kind();
        let draft = Application {
            id: ApplicationId::UNASSIGNED,
            applicant,
            payload,
            status: self.plan(kind).initial_status(),
            stamps: StageStamps::default(),
            approved_at: None,
            rejection_reason: None,
            submitted_at: now,
            year: now.year(),
            version: 0,
        };
        let stored = self.registry.insert(draft)?;
        info!(%kind, id = %stored.id, title = %stored.title(), status = %stored.status, "application submitted");

        let summary = stored.summary();
        self.dispatch(Notification {
            recipient: Recipient::email(stored.applicant.email.clone()),
            template: NotificationTemplate::SubmissionReceived,
            application: summary.clone(),
            actor_name: None,
            rejection_reason: None,
        });
        self.request_decision(&stored, stored.status);
        self.dispatch(Notification {
            recipient: Recipient::email(self.config.student_service_email.clone()),
            template: NotificationTemplate::SubmissionAlert,
            application: summary,
            actor_name: None,
            rejection_reason: None,
        });
        self.record(AuditEntry {
            actor_id: stored.applicant.reg_no.clone(),
            actor_name: stored.applicant.full_name.clone(),
            action: AuditAction::Submitted,
            kind,
            application_id: stored.id,
            target: format!("{} '{}' submitted", kind, stored.title()),
            recorded_at: now,
        });

        Ok(stored)
    }

    fn announce_decision(
        &self,
        application: &Application,
        previous: ApprovalStatus,
        approver: &Approver,
        now: DateTime<Utc>,
    ) {
        let (template, action) = match application.status {
            ApprovalStatus::Approved => (NotificationTemplate::Approved, AuditAction::FinalApproval),
            ApprovalStatus::Rejected => (NotificationTemplate::Rejected, AuditAction::Rejected),
            _ => (NotificationTemplate::StageAdvanced, AuditAction::StageAdvanced),
        };

        self.dispatch(Notification {
            recipient: Recipient::email(application.applicant.email.clone()),
            template,
            application: application.summary(),
            actor_name: Some(approver.name.clone()),
            rejection_reason: application.rejection_reason.clone(),
        });
        if !application.status.is_terminal() {
            self.request_decision(application, application.status);
        }

        self.record(AuditEntry {
            actor_id: approver.id.clone(),
            actor_name: approver.name.clone(),
            action,
            kind: application.kind(),
            application_id: application.id,
            target: format!(
                "{} '{}' #{}: {} -> {} by {}",
                application.kind(),
                application.title(),
                application.id,
                previous,
                application.status,
                approver.role
            ),
            recorded_at: now,
        });
    }

    /// Tell the pool owning `status` that a decision is waiting.
    fn request_decision(&self, application: &Application, status: ApprovalStatus) {
        let Some(stage) = self.plan(application.kind()).stage_for(status) else {
            return;
        };
        let faculty = if stage.role.is_faculty_scoped() {
            application.applicant.faculty.clone()
        } else {
            None
        };
        self.dispatch(Notification {
            recipient: Recipient::ApproverPool {
                role: stage.role,
                faculty,
            },
            template: NotificationTemplate::DecisionRequested,
            application: application.summary(),
            actor_name: None,
            rejection_reason: None,
        });
    }

    fn dispatch(&self, notification: Notification) {
        let template = notification.template;
        let id = notification.application.id;
        if let Err(error) = self.notifier.notify(notification) {
            warn!(%error, ?template, %id, "notification dropped");
        }
    }

    fn record(&self, entry: AuditEntry) {
        let id = entry.application_id;
        if let Err(error) = self.audit.record(entry) {
            warn!(%error, %id, "audit record dropped");
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), WorkflowError> {
    if value.trim().is_empty() {
        return Err(WorkflowError::InvalidSubmission(format!("{field} is required")));
    }
    Ok(())
}

fn require_faculty(applicant: &Applicant) -> Result<(), WorkflowError> {
    require(
        "applicant faculty",
        applicant.faculty.as_deref().unwrap_or_default(),
    )
}
