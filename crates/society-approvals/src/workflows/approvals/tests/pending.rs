use chrono::{Datelike, Utc};

use super::common::*;
use crate::workflows::approvals::domain::{
    ApplicationKind, ApprovalStatus, ApproverRole, Decision,
};
use crate::workflows::approvals::stages::EventPermissionFlow;
use crate::workflows::approvals::WorkflowError;

#[test]
fn dean_sees_only_own_faculty_at_dean_stage() {
    let (service, _, _, _) = build_service();
    service
        .submit_registration(registration("Chess Club", SCIENCE))
        .expect("science registration");
    service
        .submit_registration(registration("Drama Circle", ARTS))
        .expect("arts registration");
    service
        .submit_event_permission(event("Chess Club", "Blitz Night"))
        .expect("event");

    let pending = service
        .pending_for(ApproverRole::Dean, Some(SCIENCE))
        .expect("dean query");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "Chess Club");
    assert_eq!(pending[0].status, ApprovalStatus::PendingDean);
}

#[test]
fn padded_faculty_is_listed_for_the_dean_who_may_decide_it() {
    let (service, _, _, _) = build_service();
    let chess = service
        .submit_registration(registration("Chess Club", "Science "))
        .expect("submitted");
    assert_eq!(chess.applicant.faculty.as_deref(), Some(SCIENCE));

    for scope in [SCIENCE, "Science ", "  Science"] {
        let visible = service
            .pending_for(ApproverRole::Dean, Some(scope))
            .expect("dean query");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, chess.id);
    }
    assert!(service
        .pending_for(ApproverRole::Dean, Some(ARTS))
        .expect("dean query")
        .is_empty());

    let outcome = service
        .decide(chess.reference(), &dean(" Science"), Decision::Approve, None)
        .expect("listed dean decides");
    assert_eq!(outcome.application.status, ApprovalStatus::PendingAr);
}

#[test]
fn dean_query_without_scope_is_refused() {
    let (service, _, _, _) = build_service();
    for scope in [None, Some(""), Some("  ")] {
        let error = service
            .pending_for(ApproverRole::Dean, scope)
            .expect_err("scope required");
        assert_eq!(
            error,
            WorkflowError::MissingScope {
                role: ApproverRole::Dean
            }
        );
    }
}

#[test]
fn assistant_registrar_sees_every_kind_at_the_ar_stage() {
    let (service, _, _, _) = build_service();
    let chess = service
        .submit_registration(registration("Chess Club", SCIENCE))
        .expect("registration");
    service
        .submit_registration(registration("Drama Circle", ARTS))
        .expect("still with the dean");
    service
        .decide(
            chess.reference(),
            &dean(SCIENCE),
            Decision::Approve,
            None,
        )
        .expect("dean approves");
    service
        .submit_event_permission(event("Chess Club", "Blitz Night"))
        .expect("event");

    let pending = service
        .pending_for(ApproverRole::AssistantRegistrar, None)
        .expect("ar query");
    let kinds: Vec<_> = pending.iter().map(|summary| summary.kind).collect();
    assert_eq!(
        kinds,
        vec![ApplicationKind::Registration, ApplicationKind::EventPermission]
    );
    assert_eq!(pending[1].title, "Blitz Night");
    assert_eq!(pending[1].society_name, "Chess Club");
}

#[test]
fn vice_chancellor_sees_events_only_in_two_stage_flow() {
    let (single, _, _, _) = build_service();
    let target = single
        .submit_event_permission(event("Chess Club", "Blitz Night"))
        .expect("event")
        .reference();
    single
        .decide(target, &assistant_registrar(), Decision::Approve, None)
        .expect("ar approves");
    assert!(single
        .pending_for(ApproverRole::ViceChancellor, None)
        .expect("vc query")
        .is_empty());

    let (double, _, _, _) = build_service_with_flow(EventPermissionFlow::ArThenVc);
    let target = double
        .submit_event_permission(event("Chess Club", "Blitz Night"))
        .expect("event")
        .reference();
    double
        .decide(target, &assistant_registrar(), Decision::Approve, None)
        .expect("ar approves");
    let pending = double
        .pending_for(ApproverRole::ViceChancellor, None)
        .expect("vc query");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, ApplicationKind::EventPermission);
}

#[test]
fn terminal_applications_leave_every_queue() {
    let (service, _, _, _) = build_service();
    approve_registration(&service, "Chess Club", SCIENCE);
    let rejected = service
        .submit_registration(registration("Drama Circle", ARTS))
        .expect("registration")
        .reference();
    service
        .decide(
            rejected,
            &dean(ARTS),
            Decision::Reject,
            Some("Duplicate of an existing club"),
        )
        .expect("rejected");

    for (role, scope) in [
        (ApproverRole::Dean, Some(SCIENCE)),
        (ApproverRole::Dean, Some(ARTS)),
        (ApproverRole::AssistantRegistrar, None),
        (ApproverRole::ViceChancellor, None),
    ] {
        assert!(service
            .pending_for(role, scope)
            .expect("query")
            .is_empty());
    }
}

#[test]
fn student_service_monitors_everything() {
    let (service, _, _, _) = build_service();
    approve_registration(&service, "Chess Club", SCIENCE);
    service
        .submit_event_permission(event("Chess Club", "Blitz Night"))
        .expect("event");

    let all = service
        .pending_for(ApproverRole::StudentService, None)
        .expect("monitoring view");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].status, ApprovalStatus::Approved);
    assert_eq!(all[1].status, ApprovalStatus::PendingAr);
}

#[test]
fn dashboard_counts_societies_and_pending_work() {
    let (service, _, _, _) = build_service();
    approve_registration(&service, "Chess Club", SCIENCE);
    service
        .submit_renewal(renewal("Chess Club", SCIENCE))
        .expect("renewal");
    service
        .submit_registration(registration("Astronomy Society", SCIENCE))
        .expect("registration");

    let year = Utc::now().year();
    let stats = service
        .dashboard(ApproverRole::Dean, Some(SCIENCE), year)
        .expect("dashboard");
    assert_eq!(stats.year, year);
    assert_eq!(stats.total_societies, 1);
    assert_eq!(stats.active_societies, 1);
    assert_eq!(stats.registrations_this_year, 2);
    assert_eq!(stats.renewals_this_year, 1);
    assert_eq!(stats.pending_approvals, 2);

    let monitoring = service
        .dashboard(ApproverRole::StudentService, None, year)
        .expect("dashboard");
    assert_eq!(monitoring.pending_approvals, 0);

    let last_year = service
        .dashboard(ApproverRole::AssistantRegistrar, None, year - 1)
        .expect("dashboard");
    assert_eq!(last_year.registrations_this_year, 0);
    assert_eq!(last_year.renewals_this_year, 0);
}
