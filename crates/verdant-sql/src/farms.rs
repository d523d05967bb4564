use chrono::{DateTime, Utc};
use models::{
    farms::{CreateFarm, CreateField},
    Id,
};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Farm {
    pub id: Id,
    pub farmer_id: Id,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<serde_json::Value>,
    pub boundary: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Field {
    pub id: Id,
    pub farm_id: Id,
    pub name: String,
    pub crop_type: String,
    pub planting_date: Option<chrono::NaiveDate>,
    pub soil_type: Option<String>,
    pub irrigation_method: Option<String>,
    pub boundary: Option<serde_json::Value>,
    pub area_hectares: Option<f64>,
    pub created_at: DateTime<Utc>,
}

const FARM_COLUMNS: &str = "id, farmer_id, name, address, location, boundary, created_at";
const FIELD_COLUMNS: &str = "id, farm_id, name, crop_type, planting_date, soil_type, \
     irrigation_method, boundary, area_hectares, created_at";

pub async fn create_farm(farmer_id: Id, farm: &CreateFarm, pool: &PgPool) -> sqlx::Result<Farm> {
    sqlx::query_as::<_, Farm>(&format!(
        r#"insert into farms (farmer_id, name, address, location, boundary)
        values ($1, $2, $3, $4, $5)
        returning {FARM_COLUMNS}"#
    ))
    .bind(farmer_id)
    .bind(&farm.name)
    .bind(&farm.address)
    .bind(&farm.location)
    .bind(&farm.boundary)
    .fetch_one(pool)
    .await
}

/// Fetches farms newest-first, optionally restricted to one farmer.
/// The restriction carries both the farmer visibility scope and the
/// admin's explicit `farmer_id` filter.
pub async fn fetch_farms(farmer_id: Option<Id>, pool: &PgPool) -> sqlx::Result<Vec<Farm>> {
    match farmer_id {
        Some(farmer_id) => {
            sqlx::query_as::<_, Farm>(&format!(
                "select {FARM_COLUMNS} from farms where farmer_id = $1 order by created_at desc"
            ))
            .bind(farmer_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Farm>(&format!(
                "select {FARM_COLUMNS} from farms order by created_at desc"
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn fetch_farm(id: Id, pool: &PgPool) -> sqlx::Result<Option<Farm>> {
    sqlx::query_as::<_, Farm>(&format!("select {FARM_COLUMNS} from farms where id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_field(farm_id: Id, field: &CreateField, pool: &PgPool) -> sqlx::Result<Field> {
    sqlx::query_as::<_, Field>(&format!(
        r#"insert into fields (farm_id, name, crop_type, planting_date, soil_type, irrigation_method, boundary, area_hectares)
        values ($1, $2, $3, $4, $5, $6, $7, $8)
        returning {FIELD_COLUMNS}"#
    ))
    .bind(farm_id)
    .bind(&field.name)
    .bind(&field.crop_type)
    .bind(field.planting_date)
    .bind(&field.soil_type)
    .bind(&field.irrigation_method)
    .bind(&field.boundary)
    .bind(field.area_hectares)
    .fetch_one(pool)
    .await
}

pub async fn fetch_fields(farm_id: Id, pool: &PgPool) -> sqlx::Result<Vec<Field>> {
    sqlx::query_as::<_, Field>(&format!(
        "select {FIELD_COLUMNS} from fields where farm_id = $1 order by created_at desc"
    ))
    .bind(farm_id)
    .fetch_all(pool)
    .await
}
