use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::config::WorkflowConfig;
use crate::workflows::approvals::audit::{AuditEntry, AuditError, AuditFilter, AuditLog};
use crate::workflows::approvals::domain::{
    Applicant, Application, ApplicationId, ApplicationKind, ApplicationRef, ApprovalStatus,
    Approver, ApproverRole, BankDetails, Decision, EventDetails, EventPermissionSubmission,
    Official, Officers, PremisesOfficer, RegistrationDetails, RegistrationSubmission,
    RenewalDetails, RenewalSubmission, SeniorTreasurer, Society, SocietyActivity,
};
use crate::workflows::approvals::notifier::{Notification, Notifier, NotifyError};
use crate::workflows::approvals::registry::{Committed, Registry, RegistryError};
use crate::workflows::approvals::stages::EventPermissionFlow;
use crate::workflows::approvals::{
    approval_router, ApprovalWorkflowService, InMemoryAuditLog, InMemoryRegistry,
    RecordingNotifier,
};

pub(super) type MemoryService =
    ApprovalWorkflowService<InMemoryRegistry, RecordingNotifier, InMemoryAuditLog>;

pub(super) const SCIENCE: &str = "Science";
pub(super) const ARTS: &str = "Arts";

pub(super) fn applicant(faculty: Option<&str>) -> Applicant {
    Applicant {
        full_name: "Nimal Perera".to_string(),
        reg_no: "SC/2022/1234".to_string(),
        email: "nimal@students.university.local".to_string(),
        mobile: "0771234567".to_string(),
        faculty: faculty.map(str::to_string),
    }
}

pub(super) fn treasurer() -> SeniorTreasurer {
    SeniorTreasurer {
        title: "Dr.".to_string(),
        full_name: "K. Silva".to_string(),
        designation: "Senior Lecturer".to_string(),
        department: "Mathematics".to_string(),
        email: "ksilva@university.local".to_string(),
        address: "Department of Mathematics".to_string(),
        mobile: "0712223344".to_string(),
    }
}

pub(super) fn officers(president: &str) -> Officers {
    Officers {
        president: Some(Official {
            reg_no: "SC/2021/0001".to_string(),
            name: president.to_string(),
            address: "Hostel A".to_string(),
            email: "president@students.university.local".to_string(),
            mobile: "0770000001".to_string(),
        }),
        ..Officers::default()
    }
}

pub(super) fn registration(name: &str, faculty: &str) -> RegistrationSubmission {
    RegistrationSubmission {
        applicant: applicant(Some(faculty)),
        details: RegistrationDetails {
            society_name: name.to_string(),
            aims: "Promote competitive play".to_string(),
            agm_date: NaiveDate::from_ymd_opt(2026, 3, 14),
            bank: BankDetails {
                account_number: "100200300".to_string(),
                bank_name: "People's Bank".to_string(),
            },
            senior_treasurer: treasurer(),
            officers: officers("Nimal Perera"),
            advisory_board: Vec::new(),
            planned_activities: vec![SocietyActivity {
                month: "June".to_string(),
                activity: "Inter-faculty tournament".to_string(),
            }],
        },
    }
}

pub(super) fn renewal(name: &str, faculty: &str) -> RenewalSubmission {
    RenewalSubmission {
        applicant: applicant(Some(faculty)),
        details: RenewalDetails {
            society_name: name.to_string(),
            agm_date: NaiveDate::from_ymd_opt(2026, 4, 2),
            bank: BankDetails {
                account_number: "900800700".to_string(),
                bank_name: "Bank of Ceylon".to_string(),
            },
            website: Some("https://chess.university.local".to_string()),
            difficulties: String::new(),
            senior_treasurer: treasurer(),
            officers: officers("Kamal Fernando"),
            previous_activities: Vec::new(),
        },
    }
}

pub(super) fn event(society: &str, event_name: &str) -> EventPermissionSubmission {
    EventPermissionSubmission {
        applicant: applicant(None),
        details: EventDetails {
            society_name: society.to_string(),
            applicant_position: "Secretary".to_string(),
            event_name: event_name.to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 11, 20).expect("valid date"),
            time_from: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            time_to: NaiveTime::from_hms_opt(16, 0, 0).expect("valid time"),
            place: "Main Hall".to_string(),
            inside_university: true,
            late_pass_required: false,
            outsiders_invited: false,
            outsiders_list: None,
            first_year_participation: true,
            budget_estimate: "LKR 25,000".to_string(),
            fund_collection_methods: "Member contributions".to_string(),
            student_fee_amount: None,
            senior_treasurer_name: "Dr. K. Silva".to_string(),
            senior_treasurer_department: "Mathematics".to_string(),
            senior_treasurer_mobile: "0712223344".to_string(),
            premises_officer: PremisesOfficer {
                name: "S. Jayasinghe".to_string(),
                designation: "Hall Warden".to_string(),
                division: "Maintenance".to_string(),
            },
            receipt_number: None,
            payment_date: None,
        },
    }
}

pub(super) fn dean(faculty: &str) -> Approver {
    Approver::new("dean-1", "Prof. Dean", ApproverRole::Dean).with_faculty(faculty)
}

pub(super) fn assistant_registrar() -> Approver {
    Approver::new("ar-1", "Ms. Registrar", ApproverRole::AssistantRegistrar)
}

pub(super) fn vice_chancellor() -> Approver {
    Approver::new("vc-1", "Prof. Chancellor", ApproverRole::ViceChancellor)
}

pub(super) fn student_service() -> Approver {
    Approver::new("ss-1", "Student Service Desk", ApproverRole::StudentService)
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryRegistry>,
    Arc<RecordingNotifier>,
    Arc<InMemoryAuditLog>,
) {
    build_service_with_flow(EventPermissionFlow::ArOnly)
}

pub(super) fn build_service_with_flow(
    flow: EventPermissionFlow,
) -> (
    MemoryService,
    Arc<InMemoryRegistry>,
    Arc<RecordingNotifier>,
    Arc<InMemoryAuditLog>,
) {
    let registry = Arc::new(InMemoryRegistry::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let audit = Arc::new(InMemoryAuditLog::default());
    let config = WorkflowConfig {
        event_permission_flow: flow,
        ..WorkflowConfig::default()
    };
    let service =
        ApprovalWorkflowService::new(registry.clone(), notifier.clone(), audit.clone(), config);
    (service, registry, notifier, audit)
}

/// Walk a registration through all three stages.
pub(super) fn approve_registration(service: &MemoryService, name: &str, faculty: &str) -> Society {
    let application = service
        .submit_registration(registration(name, faculty))
        .expect("registration accepted");
    let target = application.reference();
    service
        .decide(target, &dean(faculty), Decision::Approve, None)
        .expect("dean approves");
    service
        .decide(target, &assistant_registrar(), Decision::Approve, None)
        .expect("ar approves");
    service
        .decide(target, &vice_chancellor(), Decision::Approve, None)
        .expect("vc approves")
        .society
        .expect("society created")
}

pub(super) fn reference(kind: ApplicationKind, id: u64) -> ApplicationRef {
    ApplicationRef::new(kind, ApplicationId(id))
}

pub(super) fn status_of(registry: &InMemoryRegistry, target: ApplicationRef) -> ApprovalStatus {
    registry
        .get(target.kind, target.id)
        .expect("registry reachable")
        .expect("application stored")
        .status
}

pub(super) fn application_router_with_service(service: MemoryService) -> axum::Router {
    approval_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRegistry;

impl Registry for UnavailableRegistry {
    fn get(
        &self,
        _kind: ApplicationKind,
        _id: ApplicationId,
    ) -> Result<Option<Application>, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _application: Application) -> Result<Application, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn commit(
        &self,
        _application: Application,
        _society: Option<Society>,
    ) -> Result<Committed, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _application: Application) -> Result<Application, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn find_by_status(
        &self,
        _kind: ApplicationKind,
        _status: ApprovalStatus,
    ) -> Result<Vec<Application>, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn find_by_status_and_faculty(
        &self,
        _kind: ApplicationKind,
        _status: ApprovalStatus,
        _faculty: &str,
    ) -> Result<Vec<Application>, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn find_all(&self, _kind: ApplicationKind) -> Result<Vec<Application>, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn find_society_by_name(&self, _name: &str) -> Result<Option<Society>, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn save_society(&self, _society: Society) -> Result<Society, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }

    fn societies(&self) -> Result<Vec<Society>, RegistryError> {
        Err(RegistryError::Unavailable("database offline".to_string()))
    }
}

/// Registry whose commits always lose to a concurrent writer that finalized
/// the record first.
pub(super) struct RacingRegistry {
    pub(super) inner: InMemoryRegistry,
}

impl Registry for RacingRegistry {
    fn get(
        &self,
        kind: ApplicationKind,
        id: ApplicationId,
    ) -> Result<Option<Application>, RegistryError> {
        self.inner.get(kind, id)
    }

    fn insert(&self, application: Application) -> Result<Application, RegistryError> {
        self.inner.insert(application)
    }

    fn commit(
        &self,
        mut application: Application,
        _society: Option<Society>,
    ) -> Result<Committed, RegistryError> {
        application.status = ApprovalStatus::Rejected;
        application.rejection_reason = Some("decided elsewhere".to_string());
        self.inner.commit(application, None)?;
        Err(RegistryError::Conflict)
    }

    fn save(&self, application: Application) -> Result<Application, RegistryError> {
        self.inner.save(application)
    }

    fn find_by_status(
        &self,
        kind: ApplicationKind,
        status: ApprovalStatus,
    ) -> Result<Vec<Application>, RegistryError> {
        self.inner.find_by_status(kind, status)
    }

    fn find_by_status_and_faculty(
        &self,
        kind: ApplicationKind,
        status: ApprovalStatus,
        faculty: &str,
    ) -> Result<Vec<Application>, RegistryError> {
        self.inner.find_by_status_and_faculty(kind, status, faculty)
    }

    fn find_all(&self, kind: ApplicationKind) -> Result<Vec<Application>, RegistryError> {
        self.inner.find_all(kind)
    }

    fn find_society_by_name(&self, name: &str) -> Result<Option<Society>, RegistryError> {
        self.inner.find_society_by_name(name)
    }

    fn save_society(&self, society: Society) -> Result<Society, RegistryError> {
        self.inner.save_society(society)
    }

    fn societies(&self) -> Result<Vec<Society>, RegistryError> {
        self.inner.societies()
    }
}

/// Registry where another writer edits the society between the service's
/// read and its commit.
pub(super) struct SocietyEditingRegistry {
    pub(super) inner: InMemoryRegistry,
}

impl Registry for SocietyEditingRegistry {
    fn get(
        &self,
        kind: ApplicationKind,
        id: ApplicationId,
    ) -> Result<Option<Application>, RegistryError> {
        self.inner.get(kind, id)
    }

    fn insert(&self, application: Application) -> Result<Application, RegistryError> {
        self.inner.insert(application)
    }

    fn commit(
        &self,
        application: Application,
        society: Option<Society>,
    ) -> Result<Committed, RegistryError> {
        if let Some(snapshot) = &society {
            if let Some(mut current) = self.inner.find_society(snapshot.id)? {
                current.aims = "Edited by the society office".to_string();
                self.inner.save_society(current)?;
            }
        }
        self.inner.commit(application, society)
    }

    fn save(&self, application: Application) -> Result<Application, RegistryError> {
        self.inner.save(application)
    }

    fn find_by_status(
        &self,
        kind: ApplicationKind,
        status: ApprovalStatus,
    ) -> Result<Vec<Application>, RegistryError> {
        self.inner.find_by_status(kind, status)
    }

    fn find_by_status_and_faculty(
        &self,
        kind: ApplicationKind,
        status: ApprovalStatus,
        faculty: &str,
    ) -> Result<Vec<Application>, RegistryError> {
        self.inner.find_by_status_and_faculty(kind, status, faculty)
    }

    fn find_all(&self, kind: ApplicationKind) -> Result<Vec<Application>, RegistryError> {
        self.inner.find_all(kind)
    }

    fn find_society_by_name(&self, name: &str) -> Result<Option<Society>, RegistryError> {
        self.inner.find_society_by_name(name)
    }

    fn save_society(&self, society: Society) -> Result<Society, RegistryError> {
        self.inner.save_society(society)
    }

    fn societies(&self) -> Result<Vec<Society>, RegistryError> {
        self.inner.societies()
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay down".to_string()))
    }
}

pub(super) struct FailingAuditLog;

impl AuditLog for FailingAuditLog {
    fn record(&self, _entry: AuditEntry) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("audit store offline".to_string()))
    }

    fn entries(&self, _filter: &AuditFilter) -> Result<Vec<AuditEntry>, AuditError> {
        Err(AuditError::Unavailable("audit store offline".to_string()))
    }
}
