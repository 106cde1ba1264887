use serde::{Deserialize, Serialize};

use super::domain::{ApplicationSummary, ApproverRole};

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recipient {
    Email { address: String },
    /// Every approver holding `role`, narrowed to `faculty` for scoped roles.
    ApproverPool {
        role: ApproverRole,
        faculty: Option<String>,
    },
}

impl Recipient {
    pub fn email(address: impl Into<String>) -> Self {
        Self::Email {
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    SubmissionReceived,
    SubmissionAlert,
    DecisionRequested,
    StageAdvanced,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub template: NotificationTemplate,
    pub application: ApplicationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// One-way outbound messages (e-mail or similar). Delivery is not guaranteed.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
