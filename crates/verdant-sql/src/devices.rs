use chrono::{DateTime, Utc};
use models::{
    authorizations::Scope,
    devices::{CreateDevice, DeviceFilter, UpdateDevice},
    DeviceStatus, Id,
};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Device {
    pub id: Id,
    pub serial_number: String,
    pub device_type: String,
    pub status: DeviceStatus,
    pub farm_id: Option<Id>,
    pub farmer_id: Option<Id>,
    pub registered_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

const DEVICE_COLUMNS: &str =
    "id, serial_number, device_type, status, farm_id, farmer_id, registered_at, last_seen_at";

pub async fn create_device(device: &CreateDevice, pool: &PgPool) -> sqlx::Result<Device> {
    sqlx::query_as::<_, Device>(&format!(
        r#"insert into devices (serial_number, device_type, status, farm_id, farmer_id)
        values ($1, $2, $3, $4, $5)
        returning {DEVICE_COLUMNS}"#
    ))
    .bind(&device.serial_number)
    .bind(&device.device_type)
    .bind(device.status.unwrap_or_default())
    .bind(device.farm_id)
    .bind(device.farmer_id)
    .fetch_one(pool)
    .await
}

/// Composes the device listing: visibility scope first, then the
/// caller's explicit filters, newest registrations first.
fn list_query<'a>(scope: &Scope, filter: &'a DeviceFilter) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "select {DEVICE_COLUMNS} from devices where true"
    ));

    if let Scope::Farmer(farmer_id) = scope {
        query.push(" and farmer_id = ");
        query.push_bind(*farmer_id);
    }
    if let Some(farmer_id) = filter.farmer_id {
        query.push(" and farmer_id = ");
        query.push_bind(farmer_id);
    }
    if let Some(farm_id) = filter.farm_id {
        query.push(" and farm_id = ");
        query.push_bind(farm_id);
    }
    if let Some(status) = filter.status {
        query.push(" and status = ");
        query.push_bind(status);
    }
    query.push(" order by registered_at desc");
    query
}

pub async fn fetch_devices(
    scope: &Scope,
    filter: &DeviceFilter,
    pool: &PgPool,
) -> sqlx::Result<Vec<Device>> {
    list_query(scope, filter)
        .build_query_as::<Device>()
        .fetch_all(pool)
        .await
}

pub async fn fetch_device(id: Id, pool: &PgPool) -> sqlx::Result<Option<Device>> {
    sqlx::query_as::<_, Device>(&format!(
        "select {DEVICE_COLUMNS} from devices where id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_device(
    id: Id,
    update: &UpdateDevice,
    pool: &PgPool,
) -> sqlx::Result<Option<Device>> {
    // Callers reject empty updates, so at least one assignment follows.
    let mut query = QueryBuilder::<Postgres>::new("update devices set ");
    let mut sep = "";

    if let Some(status) = update.status {
        query.push(sep).push("status = ").push_bind(status);
        sep = ", ";
    }
    if let Some(farm_id) = update.farm_id {
        query.push(sep).push("farm_id = ").push_bind(farm_id);
        sep = ", ";
    }
    if let Some(farmer_id) = update.farmer_id {
        query.push(sep).push("farmer_id = ").push_bind(farmer_id);
    }
    query.push(" where id = ");
    query.push_bind(id);
    query.push(format!(" returning {DEVICE_COLUMNS}"));

    query
        .build_query_as::<Device>()
        .fetch_optional(pool)
        .await
}

/// Hard delete. Returns false when no such device exists.
pub async fn delete_device(id: Id, pool: &PgPool) -> sqlx::Result<bool> {
    let result = sqlx::query("delete from devices where id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod test {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn list_query_scopes_farmers_before_filters() {
        let filter = DeviceFilter {
            status: Some(DeviceStatus::Active),
            ..Default::default()
        };
        let mut query = list_query(&Scope::Farmer(Id::new(7)), &filter);
        insta::assert_snapshot!(
            query.build().sql(),
            @"select id, serial_number, device_type, status, farm_id, farmer_id, registered_at, last_seen_at from devices where true and farmer_id = $1 and status = $2 order by registered_at desc"
        );
    }

    #[test]
    fn list_query_leaves_admins_unrestricted() {
        let filter = DeviceFilter::default();
        let mut query = list_query(&Scope::Unrestricted, &filter);
        insta::assert_snapshot!(
            query.build().sql(),
            @"select id, serial_number, device_type, status, farm_id, farmer_id, registered_at, last_seen_at from devices where true order by registered_at desc"
        );
    }
}
