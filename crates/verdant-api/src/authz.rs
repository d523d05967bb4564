//! Role and ownership decisions, made over ownership facts the SQL
//! layer has already resolved. Every function here is pure: fetch the
//! facts, then decide, so nothing is written before a denial.

use models::{
    alerts::{AlertUpdatePlan, UpdateAlert},
    authorizations::AccessClaims,
    AlertStatus, Id, Role,
};
use verdant_sql::alerts::AlertOwners;

/// Status targets a farmer may set through the generic alert update,
/// provided no other field changes in the same call. Admins are not
/// restricted by this table.
pub const FARMER_STATUS_TARGETS: &[AlertStatus] = &[AlertStatus::Acknowledged, AlertStatus::Closed];

/// Whether this identity may act on a record owned by `owner`.
/// A record with no owner is admin-only.
pub fn owns(claims: &AccessClaims, owner: Option<Id>) -> bool {
    match claims.role {
        Role::Admin => true,
        Role::Farmer => owner == Some(claims.sub),
    }
}

/// Whether this identity may read (and, for farmers, status-update) an
/// alert: related through any of its direct farmer reference, its
/// farm's owner, or its device's owner.
pub fn can_access_alert(claims: &AccessClaims, owners: &AlertOwners) -> bool {
    match claims.role {
        Role::Admin => true,
        Role::Farmer => {
            let me = Some(claims.sub);
            owners.farmer_id == me
                || owners.farm_owner_id == me
                || owners.device_owner_id == me
        }
    }
}

/// Why an alert update was refused before reaching the store.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UpdateDenied {
    #[error("Nothing to update.")]
    NothingToUpdate,
    #[error("Farmers may only update an alert's status.")]
    FieldNotAllowed,
    #[error("Farmers may only set alert status to acknowledged or closed.")]
    StatusNotAllowed,
}

/// Resolves an update request into a concrete mutation plan, or
/// refuses it.
///
/// The alert lifecycle is a soft state machine: any status may follow
/// any other through the generic update, constrained only by the
/// farmer target-status table. Timestamp side effects are derived
/// here: entering `acknowledged` stamps `acknowledged_at`, entering a
/// terminal status stamps `resolved_at`.
pub fn plan_alert_update(
    claims: &AccessClaims,
    update: &UpdateAlert,
) -> Result<AlertUpdatePlan, UpdateDenied> {
    if update.is_empty() {
        return Err(UpdateDenied::NothingToUpdate);
    }

    if let Role::Farmer = claims.role {
        if update.changes_non_status_fields() {
            return Err(UpdateDenied::FieldNotAllowed);
        }
        match update.status {
            Some(status) if FARMER_STATUS_TARGETS.contains(&status) => (),
            _ => return Err(UpdateDenied::StatusNotAllowed),
        }
    }

    Ok(AlertUpdatePlan {
        alert_type: update.alert_type.clone(),
        severity: update.severity,
        message: update.message.clone(),
        details: update.details.clone(),
        status: update.status,
        stamp_acknowledged: update.status == Some(AlertStatus::Acknowledged),
        stamp_resolved: update.status.is_some_and(|status| status.is_terminal()),
    })
}
