use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::domain::{
    normalize_faculty, ApplicationKind, ApplicationSummary, ApproverRole, SocietyStatus,
};
use super::error::WorkflowError;
use super::registry::Registry;
use super::stages::{EventPermissionFlow, StagePlan};

/// Read-only view of the work waiting on each approver role.
pub struct PendingWorkQuery<R> {
    registry: Arc<R>,
    event_permission_flow: EventPermissionFlow,
}

impl<R> PendingWorkQuery<R>
where
    R: Registry + 'static,
{
    pub fn new(registry: Arc<R>, event_permission_flow: EventPermissionFlow) -> Self {
        Self {
            registry,
            event_permission_flow,
        }
    }

    /// Applications currently awaiting `role`'s decision, across all kinds.
    ///
    /// Deans must pass their faculty as `scope`. Student Service receives every
    /// application regardless of status.
    pub fn pending_for(
        &self,
        role: ApproverRole,
        scope: Option<&str>,
    ) -> Result<Vec<ApplicationSummary>, WorkflowError> {
        if role == ApproverRole::StudentService {
            return self.monitoring_view();
        }

        let faculty = if role.is_faculty_scoped() {
            Some(normalize_faculty(scope).ok_or(WorkflowError::MissingScope { role })?)
        } else {
            None
        };

        let mut summaries = Vec::new();
        for kind in ApplicationKind::ordered() {
            let plan = StagePlan::for_kind(kind, self.event_permission_flow);
            for stage in plan.stages_owned_by(role) {
                let applications = match faculty {
                    Some(faculty) => {
                        self.registry
                            .find_by_status_and_faculty(kind, stage.status, faculty)?
                    }
                    None => self.registry.find_by_status(kind, stage.status)?,
                };
                debug!(%kind, status = %stage.status, count = applications.len(), "pending work");
                summaries.extend(applications.iter().map(|application| application.summary()));
            }
        }

        Ok(summaries)
    }

    fn monitoring_view(&self) -> Result<Vec<ApplicationSummary>, WorkflowError> {
        let mut summaries = Vec::new();
        for kind in ApplicationKind::ordered() {
            summaries.extend(
                self.registry
                    .find_all(kind)?
                    .iter()
                    .map(|application| application.summary()),
            );
        }
        Ok(summaries)
    }

    /// Headline counts for an approver's landing page.
    pub fn dashboard(
        &self,
        role: ApproverRole,
        scope: Option<&str>,
        year: i32,
    ) -> Result<DashboardStats, WorkflowError> {
        let societies = self.registry.societies()?;
        let active_societies = societies
            .iter()
            .filter(|society| society.status == SocietyStatus::Active)
            .count();
        let submitted_in = |kind: ApplicationKind| -> Result<usize, WorkflowError> {
            Ok(self
                .registry
                .find_all(kind)?
                .iter()
                .filter(|application| application.year == year)
                .count())
        };

        let pending_approvals = match role {
            ApproverRole::StudentService => 0,
            _ => self.pending_for(role, scope)?.len(),
        };

        Ok(DashboardStats {
            year,
            total_societies: societies.len(),
            active_societies,
            registrations_this_year: submitted_in(ApplicationKind::Registration)?,
            renewals_this_year: submitted_in(ApplicationKind::Renewal)?,
            pending_approvals,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub year: i32,
    pub total_societies: usize,
    pub active_societies: usize,
    pub registrations_this_year: usize,
    pub renewals_this_year: usize,
    pub pending_approvals: usize,
}
