use crate::Id;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Operational status of a registered device. Mutated by admins, or
/// implicitly by device heartbeats.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "device_status")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Inactive,
    Error,
    Maintenance,
    Decommissioned,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        DeviceStatus::Active
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match *self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
            DeviceStatus::Error => "error",
            DeviceStatus::Maintenance => "maintenance",
            DeviceStatus::Decommissioned => "decommissioned",
        };
        f.write_str(s)
    }
}

/// CreateDevice is the body of `POST /devices` (admin only).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDevice {
    #[validate(length(min = 1, message = "Serial number is required."))]
    pub serial_number: String,
    #[validate(length(min = 1, message = "Device type is required."))]
    pub device_type: String,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
    #[serde(default)]
    pub farm_id: Option<Id>,
    #[serde(default)]
    pub farmer_id: Option<Id>,
}

/// UpdateDevice is the body of `PUT /devices/{id}` (admin only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDevice {
    #[serde(default)]
    pub status: Option<DeviceStatus>,
    #[serde(default)]
    pub farm_id: Option<Id>,
    #[serde(default)]
    pub farmer_id: Option<Id>,
}

impl UpdateDevice {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.farm_id.is_none() && self.farmer_id.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceFilter {
    #[serde(default)]
    pub farmer_id: Option<Id>,
    #[serde(default)]
    pub farm_id: Option<Id>,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn device_status_serde_round_trips() {
        let status: DeviceStatus = serde_json::from_str("\"maintenance\"").unwrap();
        assert_eq!(status, DeviceStatus::Maintenance);
        assert_eq!(
            serde_json::to_string(&DeviceStatus::Decommissioned).unwrap(),
            "\"decommissioned\""
        );
        assert!(serde_json::from_str::<DeviceStatus>("\"exploded\"").is_err());
    }

    #[test]
    fn update_emptiness() {
        assert!(UpdateDevice::default().is_empty());
        let update = UpdateDevice {
            status: Some(DeviceStatus::Error),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
