use crate::infra::describe_recipient;
use chrono::{Datelike, Duration, Local, NaiveTime};
use clap::Args;
use society_approvals::config::WorkflowConfig;
use society_approvals::error::AppError;
use society_approvals::workflows::approvals::{
    Applicant, ApplicationRef, ApprovalWorkflowService, Approver, ApproverRole, AuditFilter,
    BankDetails, Decision, EventDetails, EventPermissionFlow, EventPermissionSubmission,
    InMemoryAuditLog, InMemoryRegistry, Official, Officers, PremisesOfficer, RecordingNotifier,
    RegistrationDetails, RegistrationSubmission, RenewalDetails, RenewalSubmission,
    SeniorTreasurer, SocietyActivity, SocietyFilter,
};
use std::sync::Arc;

type DemoService = ApprovalWorkflowService<InMemoryRegistry, RecordingNotifier, InMemoryAuditLog>;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Name of the society registered during the demo.
    #[arg(long, default_value = "Chess Club")]
    pub(crate) society: String,
    /// Faculty the society belongs to; the Dean of this faculty signs first.
    #[arg(long, default_value = "Science")]
    pub(crate) faculty: String,
    /// Event permission chain: ar_only or ar_then_vc.
    #[arg(long, value_parser = crate::infra::parse_event_flow)]
    pub(crate) event_flow: Option<EventPermissionFlow>,
    /// Skip the event permission portion of the demo.
    #[arg(long)]
    pub(crate) skip_event: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        society,
        faculty,
        event_flow,
        skip_event,
    } = args;

    let notifier = Arc::new(RecordingNotifier::default());
    let config = WorkflowConfig {
        event_permission_flow: event_flow.unwrap_or_default(),
        ..WorkflowConfig::default()
    };
    let service = ApprovalWorkflowService::new(
        Arc::new(InMemoryRegistry::default()),
        notifier.clone(),
        Arc::new(InMemoryAuditLog::default()),
        config,
    );

    let dean = Approver::new("dean", format!("Dean of {faculty}"), ApproverRole::Dean)
        .with_faculty(faculty.clone());
    let registrar = Approver::new("ar", "Assistant Registrar", ApproverRole::AssistantRegistrar);
    let chancellor = Approver::new("vc", "Vice Chancellor", ApproverRole::ViceChancellor);

    println!("Society approval workflow demo");
    println!(
        "Event permissions follow the {:?} chain",
        service.config().event_permission_flow
    );

    println!("\nRegistration of '{society}'");
    let registration = service.submit_registration(registration_submission(&society, &faculty))?;
    println!(
        "- Submitted {} #{} -> {}",
        registration.kind(),
        registration.id,
        registration.status
    );
    walk(
        &service,
        registration.reference(),
        &[&dean, &registrar, &chancellor],
    )?;

    println!("\nAnnual renewal of '{society}'");
    let renewal = service.submit_renewal(renewal_submission(&society, &faculty))?;
    println!(
        "- Submitted {} #{} -> {}",
        renewal.kind(),
        renewal.id,
        renewal.status
    );
    walk(
        &service,
        renewal.reference(),
        &[&dean, &registrar, &chancellor],
    )?;

    if !skip_event {
        println!("\nEvent permission for '{society}'");
        let event = service.submit_event_permission(event_submission(&society))?;
        println!("- Submitted {} #{} -> {}", event.kind(), event.id, event.status);
        let chain = match service.config().event_permission_flow {
            EventPermissionFlow::ArOnly => vec![&registrar],
            EventPermissionFlow::ArThenVc => vec![&registrar, &chancellor],
        };
        walk(&service, event.reference(), &chain)?;
    }

    println!("\nSociety registry");
    for record in service.societies(&SocietyFilter::default())? {
        println!(
            "  - #{} {} ({}) registered {} | last renewal {}",
            record.id.0,
            record.name,
            record.faculty,
            record.registered_on,
            record
                .last_renewal_year
                .map(|year| year.to_string())
                .unwrap_or_else(|| "never".to_string())
        );
    }

    let year = Local::now().year();
    let stats = service.dashboard(ApproverRole::StudentService, None, year)?;
    println!(
        "\nDashboard {}: {} societies ({} active) | {} registrations | {} renewals",
        stats.year,
        stats.total_societies,
        stats.active_societies,
        stats.registrations_this_year,
        stats.renewals_this_year
    );

    println!("\nNotifications");
    for notification in notifier.sent() {
        println!(
            "  - {:?} -> {} [{} #{}]",
            notification.template,
            describe_recipient(&notification.recipient),
            notification.application.kind,
            notification.application.id
        );
    }

    println!("\nActivity log (newest first)");
    for entry in service.activity(&AuditFilter::default()) {
        println!(
            "  - {} | {} | {} | {}",
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            entry.actor_name,
            entry.action_label(),
            entry.target
        );
    }

    Ok(())
}

fn walk(
    service: &DemoService,
    target: ApplicationRef,
    chain: &[&Approver],
) -> Result<(), AppError> {
    for approver in chain {
        let outcome = service.decide(target, approver, Decision::Approve, None)?;
        println!(
            "- {} approved -> {}",
            approver.role, outcome.application.status
        );
        if let Some(society) = outcome.society {
            println!("  Registry updated: '{}' (#{})", society.name, society.id.0);
        }
    }
    Ok(())
}

fn applicant(faculty: &str) -> Applicant {
    Applicant {
        full_name: "Demo Student".to_string(),
        reg_no: "DEMO/2026/001".to_string(),
        email: "student@students.university.local".to_string(),
        mobile: "0770000000".to_string(),
        faculty: Some(faculty.to_string()),
    }
}

fn treasurer() -> SeniorTreasurer {
    SeniorTreasurer {
        title: "Dr.".to_string(),
        full_name: "Demo Treasurer".to_string(),
        designation: "Senior Lecturer".to_string(),
        department: "Mathematics".to_string(),
        email: "treasurer@university.local".to_string(),
        address: "Department of Mathematics".to_string(),
        mobile: "0711111111".to_string(),
    }
}

fn officers() -> Officers {
    Officers {
        president: Some(Official {
            reg_no: "DEMO/2026/001".to_string(),
            name: "Demo Student".to_string(),
            address: "Hostel A".to_string(),
            email: "student@students.university.local".to_string(),
            mobile: "0770000000".to_string(),
        }),
        ..Officers::default()
    }
}

fn registration_submission(society: &str, faculty: &str) -> RegistrationSubmission {
    RegistrationSubmission {
        applicant: applicant(faculty),
        details: RegistrationDetails {
            society_name: society.to_string(),
            aims: "Promote the game across faculties".to_string(),
            agm_date: Some(Local::now().date_naive()),
            bank: BankDetails {
                account_number: "000111222".to_string(),
                bank_name: "People's Bank".to_string(),
            },
            senior_treasurer: treasurer(),
            officers: officers(),
            advisory_board: Vec::new(),
            planned_activities: vec![SocietyActivity {
                month: "March".to_string(),
                activity: "Freshers' tournament".to_string(),
            }],
        },
    }
}

fn renewal_submission(society: &str, faculty: &str) -> RenewalSubmission {
    RenewalSubmission {
        applicant: applicant(faculty),
        details: RenewalDetails {
            society_name: society.to_string(),
            agm_date: Some(Local::now().date_naive()),
            bank: BankDetails {
                account_number: "000111333".to_string(),
                bank_name: "People's Bank".to_string(),
            },
            website: Some("https://society.university.local".to_string()),
            difficulties: String::new(),
            senior_treasurer: treasurer(),
            officers: officers(),
            previous_activities: Vec::new(),
        },
    }
}

fn event_submission(society: &str) -> EventPermissionSubmission {
    let event_date = Local::now().date_naive() + Duration::days(30);
    EventPermissionSubmission {
        applicant: Applicant {
            faculty: None,
            ..applicant("")
        },
        details: EventDetails {
            society_name: society.to_string(),
            applicant_position: "President".to_string(),
            event_name: format!("{society} Open Day"),
            event_date,
            time_from: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            time_to: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            place: "Main Hall".to_string(),
            inside_university: true,
            late_pass_required: false,
            outsiders_invited: false,
            outsiders_list: None,
            first_year_participation: true,
            budget_estimate: "LKR 20,000".to_string(),
            fund_collection_methods: "Member contributions".to_string(),
            student_fee_amount: None,
            senior_treasurer_name: "Dr. Demo Treasurer".to_string(),
            senior_treasurer_department: "Mathematics".to_string(),
            senior_treasurer_mobile: "0711111111".to_string(),
            premises_officer: PremisesOfficer {
                name: "Hall Warden".to_string(),
                designation: "Warden".to_string(),
                division: "Maintenance".to_string(),
            },
            receipt_number: None,
            payment_date: None,
        },
    }
}
