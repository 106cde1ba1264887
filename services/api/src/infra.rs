use metrics_exporter_prometheus::PrometheusHandle;
use society_approvals::workflows::approvals::{
    EventPermissionFlow, Notification, Notifier, NotifyError, Recipient,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Notifier that writes each message to the structured log in place of e-mail.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let recipient = describe_recipient(&notification.recipient);
        info!(
            template = ?notification.template,
            %recipient,
            kind = %notification.application.kind,
            id = %notification.application.id,
            title = %notification.application.title,
            status = %notification.application.status,
            "notification queued"
        );
        Ok(())
    }
}

pub(crate) fn describe_recipient(recipient: &Recipient) -> String {
    match recipient {
        Recipient::Email { address } => address.clone(),
        Recipient::ApproverPool {
            role,
            faculty: Some(faculty),
        } => format!("{role} ({faculty})"),
        Recipient::ApproverPool { role, faculty: None } => role.to_string(),
    }
}

pub(crate) fn parse_event_flow(raw: &str) -> Result<EventPermissionFlow, String> {
    EventPermissionFlow::parse(raw)
        .ok_or_else(|| format!("unknown event permission flow '{raw}' (use ar_only or ar_then_vc)"))
}
