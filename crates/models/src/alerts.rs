use crate::Id;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "alert_severity")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for AlertSeverity {
    fn default() -> Self {
        AlertSeverity::Medium
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl AlertSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

/// Lifecycle status of an alert. The expected progression is
/// `new -> acknowledged -> in_progress -> resolved -> closed`, with
/// `closed` also reachable directly from `new`/`acknowledged`.
/// No transition table is enforced: any status may follow any other
/// through the generic update, constrained only by role rules.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "alert_status")]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    New,
    Acknowledged,
    InProgress,
    Resolved,
    Closed,
}

impl Default for AlertStatus {
    fn default() -> Self {
        AlertStatus::New
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl AlertStatus {
    pub fn name(&self) -> &'static str {
        match self {
            AlertStatus::New => "new",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::InProgress => "in_progress",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Closed => "closed",
        }
    }

    fn all() -> &'static [AlertStatus] {
        &[
            AlertStatus::New,
            AlertStatus::Acknowledged,
            AlertStatus::InProgress,
            AlertStatus::Resolved,
            AlertStatus::Closed,
        ]
    }

    pub fn from_str(name: &str) -> Option<AlertStatus> {
        for status in AlertStatus::all() {
            if name.eq_ignore_ascii_case(status.name()) {
                return Some(*status);
            }
        }
        None
    }

    /// Whether entering this status stamps `resolved_at`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Resolved | AlertStatus::Closed)
    }
}

/// CreateAlert is the body of `POST /alerts`. Manual creation is an
/// admin operation; system producers insert rows directly.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAlert {
    #[validate(length(min = 1, message = "Alert type is required."))]
    pub alert_type: String,
    #[serde(default)]
    pub severity: Option<AlertSeverity>,
    #[validate(length(min = 1, message = "Message is required."))]
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub farmer_id: Option<Id>,
    #[serde(default)]
    pub device_id: Option<Id>,
    #[serde(default)]
    pub farm_id: Option<Id>,
    #[serde(default)]
    pub field_id: Option<Id>,
}

/// UpdateAlert is the body of `PUT /alerts/{id}`. All fields are
/// optional; an update naming none of them is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAlert {
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub severity: Option<AlertSeverity>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<AlertStatus>,
}

impl UpdateAlert {
    pub fn is_empty(&self) -> bool {
        self.alert_type.is_none()
            && self.severity.is_none()
            && self.message.is_none()
            && self.details.is_none()
            && self.status.is_none()
    }

    /// True when the update touches any field other than `status`.
    pub fn changes_non_status_fields(&self) -> bool {
        self.alert_type.is_some()
            || self.severity.is_some()
            || self.message.is_some()
            || self.details.is_some()
    }
}

/// AlertUpdatePlan is a fully-resolved alert mutation: the fields to
/// write plus the timestamp stamps derived from the target status.
/// Plans are produced before any write is attempted, so a rejected
/// update has no partial effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertUpdatePlan {
    pub alert_type: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub message: Option<String>,
    pub details: Option<serde_json::Value>,
    pub status: Option<AlertStatus>,
    /// Stamp `acknowledged_at = now()` alongside the status write.
    pub stamp_acknowledged: bool,
    /// Stamp `resolved_at = now()` alongside the status write.
    pub stamp_resolved: bool,
}

/// Explicit filters of `GET /alerts`, AND-composed after the caller's
/// visibility scope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub farmer_id: Option<Id>,
    #[serde(default)]
    pub device_id: Option<Id>,
    #[serde(default)]
    pub farm_id: Option<Id>,
    #[serde(default)]
    pub field_id: Option<Id>,
    #[serde(default)]
    pub status: Option<AlertStatus>,
    #[serde(default)]
    pub severity: Option<AlertSeverity>,
    #[serde(default)]
    pub alert_type: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_names_round_trip() {
        for status in AlertStatus::all() {
            assert_eq!(AlertStatus::from_str(status.name()), Some(*status));
        }
        assert_eq!(AlertStatus::from_str("IN_PROGRESS"), Some(AlertStatus::InProgress));
        assert_eq!(AlertStatus::from_str("escalated"), None);
    }

    #[test]
    fn status_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&AlertStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: AlertStatus = serde_json::from_str("\"acknowledged\"").unwrap();
        assert_eq!(status, AlertStatus::Acknowledged);
    }

    #[test]
    fn terminal_statuses_stamp_resolution() {
        assert!(AlertStatus::Resolved.is_terminal());
        assert!(AlertStatus::Closed.is_terminal());
        assert!(!AlertStatus::Acknowledged.is_terminal());
        assert!(!AlertStatus::New.is_terminal());
    }

    #[test]
    fn update_emptiness() {
        assert!(UpdateAlert::default().is_empty());

        let update = UpdateAlert {
            status: Some(AlertStatus::Acknowledged),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert!(!update.changes_non_status_fields());

        let update = UpdateAlert {
            severity: Some(AlertSeverity::High),
            status: Some(AlertStatus::Acknowledged),
            ..Default::default()
        };
        assert!(update.changes_non_status_fields());
    }

    #[test]
    fn severity_defaults_to_medium() {
        assert_eq!(AlertSeverity::default(), AlertSeverity::Medium);
    }
}
