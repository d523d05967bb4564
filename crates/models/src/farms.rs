use crate::Id;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// CreateFarm is the body of `POST /farms`. A farmer creates farms for
/// themselves; an admin may name any `farmer_id`. Geometry values are
/// carried opaquely as GeoJSON.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFarm {
    #[validate(length(min = 1, message = "Farm name is required."))]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub farmer_id: Option<Id>,
    #[serde(default)]
    pub location: Option<serde_json::Value>,
    #[serde(default)]
    pub boundary: Option<serde_json::Value>,
}

/// CreateField is the body of `POST /farms/{id}/fields`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateField {
    #[validate(length(min = 1, message = "Field name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Crop type is required."))]
    pub crop_type: String,
    #[serde(default)]
    pub planting_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub soil_type: Option<String>,
    #[serde(default)]
    pub irrigation_method: Option<String>,
    #[serde(default)]
    pub boundary: Option<serde_json::Value>,
    #[serde(default)]
    pub area_hectares: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FarmFilter {
    #[serde(default)]
    pub farmer_id: Option<Id>,
}

#[cfg(test)]
mod test {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_field_requires_a_crop_type() {
        let field: CreateField = serde_json::from_value(serde_json::json!({
            "name": "North paddock",
            "crop_type": "",
        }))
        .unwrap();
        assert!(field.validate().is_err());

        let field: CreateField = serde_json::from_value(serde_json::json!({
            "name": "North paddock",
            "crop_type": "maize",
            "planting_date": "2026-03-14",
            "area_hectares": 12.5,
        }))
        .unwrap();
        assert!(field.validate().is_ok());
        assert_eq!(
            field.planting_date,
            Some(chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
        );
    }
}
