use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an application, unique within its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl ApplicationId {
    /// Placeholder carried by drafts until the registry assigns a real id.
    pub const UNASSIGNED: Self = Self(0);
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a permanent society record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocietyId(pub u64);

impl SocietyId {
    pub const UNASSIGNED: Self = Self(0);
}

impl fmt::Display for SocietyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationKind {
    Registration,
    Renewal,
    EventPermission,
}

impl ApplicationKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Registration, Self::Renewal, Self::EventPermission]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Registration => "Registration",
            Self::Renewal => "Renewal",
            Self::EventPermission => "Event Permission",
        }
    }
}

impl fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Addresses one application; id spaces are disjoint per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationRef {
    pub kind: ApplicationKind,
    pub id: ApplicationId,
}

impl ApplicationRef {
    pub const fn new(kind: ApplicationKind, id: ApplicationId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ApplicationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind, self.id)
    }
}

/// Where an application sits in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    PendingDean,
    PendingAr,
    PendingVc,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingDean => "PENDING_DEAN",
            Self::PendingAr => "PENDING_AR",
            Self::PendingVc => "PENDING_VC",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverRole {
    Dean,
    AssistantRegistrar,
    ViceChancellor,
    StudentService,
}

impl ApproverRole {
    /// Deans only act within their own faculty.
    pub const fn is_faculty_scoped(self) -> bool {
        matches!(self, Self::Dean)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dean => "Dean",
            Self::AssistantRegistrar => "Assistant Registrar",
            Self::ViceChancellor => "Vice Chancellor",
            Self::StudentService => "Student Service",
        }
    }
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller identity, resolved before it reaches the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub id: String,
    pub name: String,
    pub role: ApproverRole,
    #[serde(default)]
    pub faculty: Option<String>,
}

impl Approver {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: ApproverRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            faculty: None,
        }
    }

    pub fn with_faculty(mut self, faculty: impl Into<String>) -> Self {
        self.faculty = Some(faculty.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Reject,
}

/// Contact facts for the student who filed the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub full_name: String,
    pub reg_no: String,
    pub email: String,
    pub mobile: String,
    /// Used for Dean scoping; event permissions carry none.
    #[serde(default)]
    pub faculty: Option<String>,
}

/// Canonical faculty used wherever Dean scope is compared. Blank means none.
pub fn normalize_faculty(faculty: Option<&str>) -> Option<&str> {
    faculty.map(str::trim).filter(|faculty| !faculty.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_number: String,
    pub bank_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeniorTreasurer {
    pub title: String,
    pub full_name: String,
    pub designation: String,
    pub department: String,
    pub email: String,
    pub address: String,
    pub mobile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Official {
    pub reg_no: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub mobile: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Officers {
    pub president: Option<Official>,
    pub vice_president: Option<Official>,
    pub secretary: Option<Official>,
    pub joint_secretary: Option<Official>,
    pub junior_treasurer: Option<Official>,
    pub editor: Option<Official>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryBoardMember {
    pub name: String,
    pub designation: String,
    pub department: String,
}

/// A month-tagged activity, planned or already held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocietyActivity {
    pub month: String,
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDetails {
    pub society_name: String,
    pub aims: String,
    #[serde(default)]
    pub agm_date: Option<NaiveDate>,
    pub bank: BankDetails,
    pub senior_treasurer: SeniorTreasurer,
    #[serde(default)]
    pub officers: Officers,
    #[serde(default)]
    pub advisory_board: Vec<AdvisoryBoardMember>,
    #[serde(default)]
    pub planned_activities: Vec<SocietyActivity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalDetails {
    pub society_name: String,
    #[serde(default)]
    pub agm_date: Option<NaiveDate>,
    pub bank: BankDetails,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub difficulties: String,
    pub senior_treasurer: SeniorTreasurer,
    #[serde(default)]
    pub officers: Officers,
    #[serde(default)]
    pub previous_activities: Vec<SocietyActivity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremisesOfficer {
    pub name: String,
    pub designation: String,
    pub division: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub society_name: String,
    pub applicant_position: String,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub time_from: NaiveTime,
    pub time_to: NaiveTime,
    pub place: String,
    pub inside_university: bool,
    pub late_pass_required: bool,
    pub outsiders_invited: bool,
    #[serde(default)]
    pub outsiders_list: Option<String>,
    pub first_year_participation: bool,
    pub budget_estimate: String,
    pub fund_collection_methods: String,
    #[serde(default)]
    pub student_fee_amount: Option<String>,
    pub senior_treasurer_name: String,
    pub senior_treasurer_department: String,
    pub senior_treasurer_mobile: String,
    pub premises_officer: PremisesOfficer,
    #[serde(default)]
    pub receipt_number: Option<String>,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
}

/// Kind-specific payload; the variant decides which stage plan applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ApplicationPayload {
    Registration(RegistrationDetails),
    Renewal(RenewalDetails),
    EventPermission(EventDetails),
}

impl ApplicationPayload {
    pub const fn kind(&self) -> ApplicationKind {
        match self {
            Self::Registration(_) => ApplicationKind::Registration,
            Self::Renewal(_) => ApplicationKind::Renewal,
            Self::EventPermission(_) => ApplicationKind::EventPermission,
        }
    }

    pub fn society_name(&self) -> &str {
        match self {
            Self::Registration(details) => &details.society_name,
            Self::Renewal(details) => &details.society_name,
            Self::EventPermission(details) => &details.society_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSubmission {
    pub applicant: Applicant,
    pub details: RegistrationDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalSubmission {
    pub applicant: Applicant,
    pub details: RenewalDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPermissionSubmission {
    pub applicant: Applicant,
    pub details: EventDetails,
}

/// Approval time per stage passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStamps {
    pub dean_approved_at: Option<DateTime<Utc>>,
    pub ar_approved_at: Option<DateTime<Utc>>,
    pub vc_approved_at: Option<DateTime<Utc>>,
}

impl StageStamps {
    pub fn stamp(&mut self, role: ApproverRole, at: DateTime<Utc>) {
        match role {
            ApproverRole::Dean => self.dean_approved_at = Some(at),
            ApproverRole::AssistantRegistrar => self.ar_approved_at = Some(at),
            ApproverRole::ViceChancellor => self.vc_approved_at = Some(at),
            ApproverRole::StudentService => {}
        }
    }
}

/// One application and its full lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant: Applicant,
    pub payload: ApplicationPayload,
    pub status: ApprovalStatus,
    pub stamps: StageStamps,
    pub approved_at: Option<DateTime<Utc>>,
    /// Present exactly when `status` is `Rejected`.
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub year: i32,
    /// Bumped by the registry on every commit.
    pub version: u32,
}

impl Application {
    pub fn kind(&self) -> ApplicationKind {
        self.payload.kind()
    }

    pub fn reference(&self) -> ApplicationRef {
        ApplicationRef::new(self.kind(), self.id)
    }

    pub fn faculty(&self) -> Option<&str> {
        self.applicant.faculty.as_deref()
    }

    /// Society name for registrations and renewals, event name for events.
    pub fn title(&self) -> &str {
        match &self.payload {
            ApplicationPayload::EventPermission(details) => &details.event_name,
            other => other.society_name(),
        }
    }

    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            id: self.id,
            kind: self.kind(),
            title: self.title().to_string(),
            society_name: self.payload.society_name().to_string(),
            applicant_name: self.applicant.full_name.clone(),
            faculty: self.applicant.faculty.clone(),
            submitted_at: self.submitted_at,
            status: self.status,
        }
    }
}

/// Homogeneous projection used by pending-work lists and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub kind: ApplicationKind,
    pub title: String,
    pub society_name: String,
    pub applicant_name: String,
    pub faculty: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocietyStatus {
    Active,
    Inactive,
}

/// Permanent registry entry produced by a registration's final approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Society {
    pub id: SocietyId,
    pub name: String,
    pub aims: String,
    pub faculty: String,
    pub status: SocietyStatus,
    pub bank: BankDetails,
    pub website: Option<String>,
    pub agm_date: Option<NaiveDate>,
    pub senior_treasurer: SeniorTreasurer,
    pub officers: Officers,
    pub registered_on: NaiveDate,
    pub year: i32,
    pub last_renewal_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the registry on every update; stale snapshots are refused.
    #[serde(default)]
    pub version: u32,
}

/// Registry listing filter. Every field is optional; absent fields match all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocietyFilter {
    /// Case-insensitive substring of the society name.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<SocietyStatus>,
    /// Year the society was registered.
    #[serde(default)]
    pub year: Option<i32>,
}

impl SocietyFilter {
    pub fn matches(&self, society: &Society) -> bool {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);
        search.map_or(true, |needle| society.name.to_lowercase().contains(&needle))
            && self.status.map_or(true, |status| society.status == status)
            && self.year.map_or(true, |year| society.year == year)
    }
}
