use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Submitted,
    StageAdvanced,
    FinalApproval,
    Rejected,
}

impl AuditAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::StageAdvanced => "STAGE ADVANCED",
            Self::FinalApproval => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// Immutable "who did what to what, when" record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_id: String,
    pub actor_name: String,
    pub action: AuditAction,
    pub kind: ApplicationKind,
    pub application_id: ApplicationId,
    pub target: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Action text as shown on the activity log, e.g. `RENEWAL REJECTED`.
    pub fn action_label(&self) -> String {
        format!(
            "{} {}",
            self.kind.label().to_ascii_uppercase(),
            self.action.label()
        )
    }
}

/// Case-insensitive substring filters over the activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilter {
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| match needle {
            Some(needle) if !needle.trim().is_empty() => haystack
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            _ => true,
        };
        contains(&entry.actor_name, &self.actor) && contains(&entry.action_label(), &self.action)
    }
}

/// Append-only audit trail.
pub trait AuditLog: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;

    /// Matching entries, newest first.
    fn entries(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit log unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(actor: &str, kind: ApplicationKind, action: AuditAction) -> AuditEntry {
        AuditEntry {
            actor_id: "7".to_string(),
            actor_name: actor.to_string(),
            action,
            kind,
            application_id: ApplicationId(3),
            target: "Chess Club".to_string(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn action_label_combines_kind_and_action() {
        let rejected = entry("Prof. Perera", ApplicationKind::Renewal, AuditAction::Rejected);
        assert_eq!(rejected.action_label(), "RENEWAL REJECTED");
    }

    #[test]
    fn filter_matches_actor_and_action_substrings() {
        let approved = entry(
            "Prof. Perera",
            ApplicationKind::EventPermission,
            AuditAction::FinalApproval,
        );

        assert!(AuditFilter::default().matches(&approved));
        assert!(AuditFilter {
            actor: Some("perera".to_string()),
            action: Some("event permission".to_string()),
        }
        .matches(&approved));
        assert!(!AuditFilter {
            actor: None,
            action: Some("rejected".to_string()),
        }
        .matches(&approved));
        assert!(AuditFilter {
            actor: Some("   ".to_string()),
            action: None,
        }
        .matches(&approved));
    }
}
