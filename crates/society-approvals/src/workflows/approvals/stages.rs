use serde::{Deserialize, Serialize};

use super::domain::{ApplicationKind, ApprovalStatus, ApproverRole};

/// Which approval chain event-permission requests follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPermissionFlow {
    /// Assistant Registrar decides alone.
    #[default]
    ArOnly,
    /// Assistant Registrar, then Vice Chancellor.
    ArThenVc,
}

impl EventPermissionFlow {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ar_only" | "ar" => Some(Self::ArOnly),
            "ar_then_vc" | "ar_vc" => Some(Self::ArThenVc),
            _ => None,
        }
    }
}

/// One approver role's slot in a kind's approval order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub status: ApprovalStatus,
    pub role: ApproverRole,
}

static DEAN_AR_VC: [Stage; 3] = [
    Stage {
        status: ApprovalStatus::PendingDean,
        role: ApproverRole::Dean,
    },
    Stage {
        status: ApprovalStatus::PendingAr,
        role: ApproverRole::AssistantRegistrar,
    },
    Stage {
        status: ApprovalStatus::PendingVc,
        role: ApproverRole::ViceChancellor,
    },
];

static AR_ONLY: [Stage; 1] = [Stage {
    status: ApprovalStatus::PendingAr,
    role: ApproverRole::AssistantRegistrar,
}];

static AR_THEN_VC: [Stage; 2] = [
    Stage {
        status: ApprovalStatus::PendingAr,
        role: ApproverRole::AssistantRegistrar,
    },
    Stage {
        status: ApprovalStatus::PendingVc,
        role: ApproverRole::ViceChancellor,
    },
];

/// Ordered, non-empty stage list for one application kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    stages: &'static [Stage],
}

impl StagePlan {
    pub fn for_kind(kind: ApplicationKind, flow: EventPermissionFlow) -> Self {
        let stages: &'static [Stage] = match (kind, flow) {
            (ApplicationKind::Registration | ApplicationKind::Renewal, _) => &DEAN_AR_VC,
            (ApplicationKind::EventPermission, EventPermissionFlow::ArOnly) => &AR_ONLY,
            (ApplicationKind::EventPermission, EventPermissionFlow::ArThenVc) => &AR_THEN_VC,
        };
        Self { stages }
    }

    pub fn stages(&self) -> &'static [Stage] {
        self.stages
    }

    pub fn initial_status(&self) -> ApprovalStatus {
        self.stages[0].status
    }

    pub fn stage_for(&self, status: ApprovalStatus) -> Option<Stage> {
        self.stages
            .iter()
            .copied()
            .find(|stage| stage.status == status)
    }

    /// Status reached by approving at `status`; `Approved` after the last stage.
    pub fn advance(&self, status: ApprovalStatus) -> Option<ApprovalStatus> {
        let position = self
            .stages
            .iter()
            .position(|stage| stage.status == status)?;
        Some(
            self.stages
                .get(position + 1)
                .map(|stage| stage.status)
                .unwrap_or(ApprovalStatus::Approved),
        )
    }

    pub fn stages_owned_by(&self, role: ApproverRole) -> impl Iterator<Item = Stage> + 'static {
        self.stages
            .iter()
            .copied()
            .filter(move |stage| stage.role == role)
    }
}
