use chrono::{DateTime, Utc};
use models::{
    alerts::{AlertFilter, AlertUpdatePlan, CreateAlert},
    authorizations::Scope,
    AlertSeverity, AlertStatus, Id,
};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// A row of the `alerts` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Alert {
    pub id: Id,
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub status: AlertStatus,
    pub details: Option<serde_json::Value>,
    pub farmer_id: Option<Id>,
    pub device_id: Option<Id>,
    pub farm_id: Option<Id>,
    pub field_id: Option<Id>,
    pub created_by_user_id: Option<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// The ownership references of one alert, with farm and device owners
/// resolved, fetched ahead of any authorization decision.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct AlertOwners {
    pub farmer_id: Option<Id>,
    pub farm_owner_id: Option<Id>,
    pub device_owner_id: Option<Id>,
}

const ALERT_COLUMNS: &str = "a.id, a.alert_type, a.severity, a.message, a.status, a.details, \
     a.farmer_id, a.device_id, a.farm_id, a.field_id, a.created_by_user_id, \
     a.created_at, a.updated_at, a.acknowledged_at, a.resolved_at";

#[tracing::instrument(err, level = "debug", skip(alert, pool))]
pub async fn create_alert(
    created_by: Id,
    alert: &CreateAlert,
    pool: &PgPool,
) -> sqlx::Result<Alert> {
    sqlx::query_as::<_, Alert>(&format!(
        r#"insert into alerts (alert_type, severity, message, status, details, farmer_id, device_id, farm_id, field_id, created_by_user_id)
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        returning {columns}"#,
        columns = ALERT_COLUMNS.replace("a.", "")
    ))
    .bind(&alert.alert_type)
    .bind(alert.severity.unwrap_or_default())
    .bind(&alert.message)
    .bind(AlertStatus::default())
    .bind(&alert.details)
    .bind(alert.farmer_id)
    .bind(alert.device_id)
    .bind(alert.farm_id)
    .bind(alert.field_id)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn fetch_alert(id: Id, pool: &PgPool) -> sqlx::Result<Option<Alert>> {
    sqlx::query_as::<_, Alert>(&format!(
        "select {columns} from alerts where id = $1",
        columns = ALERT_COLUMNS.replace("a.", "")
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Resolves the three ownership references of an alert in one query:
/// its direct farmer, its farm's owning farmer, and its device's
/// owning farmer. Returns None when the alert does not exist.
pub async fn fetch_alert_owners(id: Id, pool: &PgPool) -> sqlx::Result<Option<AlertOwners>> {
    sqlx::query_as::<_, AlertOwners>(
        r#"select a.farmer_id, f.farmer_id as farm_owner_id, d.farmer_id as device_owner_id
        from alerts a
        left join farms f on a.farm_id = f.id
        left join devices d on a.device_id = d.id
        where a.id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Composes the alert listing as one parameterized query.
///
/// The caller's visibility scope is applied first and is not optional:
/// a farmer sees an alert if it references them directly, or references
/// a farm or device they own. Explicit filters are AND-composed after
/// the scope. Results are newest-first.
fn list_query<'a>(scope: &Scope, filter: &'a AlertFilter) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "select {ALERT_COLUMNS} from alerts a \
         left join farms f on a.farm_id = f.id \
         left join devices d on a.device_id = d.id \
         where true"
    ));

    if let Scope::Farmer(farmer_id) = scope {
        query.push(" and (a.farmer_id = ");
        query.push_bind(*farmer_id);
        query.push(" or f.farmer_id = ");
        query.push_bind(*farmer_id);
        query.push(" or d.farmer_id = ");
        query.push_bind(*farmer_id);
        query.push(")");
    }
    if let Some(farmer_id) = filter.farmer_id {
        query.push(" and a.farmer_id = ");
        query.push_bind(farmer_id);
    }
    if let Some(device_id) = filter.device_id {
        query.push(" and a.device_id = ");
        query.push_bind(device_id);
    }
    if let Some(farm_id) = filter.farm_id {
        query.push(" and a.farm_id = ");
        query.push_bind(farm_id);
    }
    if let Some(field_id) = filter.field_id {
        query.push(" and a.field_id = ");
        query.push_bind(field_id);
    }
    if let Some(status) = filter.status {
        query.push(" and a.status = ");
        query.push_bind(status);
    }
    if let Some(severity) = filter.severity {
        query.push(" and a.severity = ");
        query.push_bind(severity);
    }
    if let Some(alert_type) = &filter.alert_type {
        query.push(" and a.alert_type = ");
        query.push_bind(alert_type);
    }
    query.push(" order by a.created_at desc");
    query
}

pub async fn fetch_alerts(
    scope: &Scope,
    filter: &AlertFilter,
    pool: &PgPool,
) -> sqlx::Result<Vec<Alert>> {
    list_query(scope, filter)
        .build_query_as::<Alert>()
        .fetch_all(pool)
        .await
}

/// Composes the single UPDATE statement applying a resolved plan.
/// `updated_at` stamps unconditionally; `acknowledged_at`/`resolved_at`
/// stamp only when the plan derived them from the target status.
fn update_query<'a>(id: Id, plan: &'a AlertUpdatePlan) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::<Postgres>::new("update alerts a set updated_at = now()");

    if let Some(alert_type) = &plan.alert_type {
        query.push(", alert_type = ").push_bind(alert_type);
    }
    if let Some(severity) = plan.severity {
        query.push(", severity = ").push_bind(severity);
    }
    if let Some(message) = &plan.message {
        query.push(", message = ").push_bind(message);
    }
    if let Some(details) = &plan.details {
        query.push(", details = ").push_bind(details);
    }
    if let Some(status) = plan.status {
        query.push(", status = ").push_bind(status);
    }
    if plan.stamp_acknowledged {
        query.push(", acknowledged_at = now()");
    }
    if plan.stamp_resolved {
        query.push(", resolved_at = now()");
    }
    query.push(" where a.id = ");
    query.push_bind(id);
    query.push(format!(" returning {ALERT_COLUMNS}"));
    query
}

/// Applies a fully-resolved update plan as one statement.
/// Returns None when the alert does not exist.
#[tracing::instrument(err, level = "debug", skip(plan, pool))]
pub async fn update_alert(
    id: Id,
    plan: &AlertUpdatePlan,
    pool: &PgPool,
) -> sqlx::Result<Option<Alert>> {
    update_query(id, plan)
        .build_query_as::<Alert>()
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod test {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn farmer_scope_is_applied_before_filters() {
        let filter = AlertFilter {
            severity: Some(AlertSeverity::Critical),
            status: Some(AlertStatus::New),
            ..Default::default()
        };
        let mut query = list_query(&Scope::Farmer(Id::new(7)), &filter);
        insta::assert_snapshot!(query.build().sql(), @"select a.id, a.alert_type, a.severity, a.message, a.status, a.details, a.farmer_id, a.device_id, a.farm_id, a.field_id, a.created_by_user_id, a.created_at, a.updated_at, a.acknowledged_at, a.resolved_at from alerts a left join farms f on a.farm_id = f.id left join devices d on a.device_id = d.id where true and (a.farmer_id = $1 or f.farmer_id = $2 or d.farmer_id = $3) and a.status = $4 and a.severity = $5 order by a.created_at desc");
    }

    #[test]
    fn admin_scope_is_unrestricted_without_explicit_filters() {
        let filter = AlertFilter::default();
        let mut query = list_query(&Scope::Unrestricted, &filter);
        insta::assert_snapshot!(query.build().sql(), @"select a.id, a.alert_type, a.severity, a.message, a.status, a.details, a.farmer_id, a.device_id, a.farm_id, a.field_id, a.created_by_user_id, a.created_at, a.updated_at, a.acknowledged_at, a.resolved_at from alerts a left join farms f on a.farm_id = f.id left join devices d on a.device_id = d.id where true order by a.created_at desc");
    }

    #[test]
    fn admin_farmer_filter_narrows_the_listing() {
        let filter = AlertFilter {
            farmer_id: Some(Id::new(7)),
            alert_type: Some("pest".to_string()),
            ..Default::default()
        };
        let mut query = list_query(&Scope::Unrestricted, &filter);
        insta::assert_snapshot!(query.build().sql(), @"select a.id, a.alert_type, a.severity, a.message, a.status, a.details, a.farmer_id, a.device_id, a.farm_id, a.field_id, a.created_by_user_id, a.created_at, a.updated_at, a.acknowledged_at, a.resolved_at from alerts a left join farms f on a.farm_id = f.id left join devices d on a.device_id = d.id where true and a.farmer_id = $1 and a.alert_type = $2 order by a.created_at desc");
    }

    #[test]
    fn every_filter_dimension_composes() {
        let filter = AlertFilter {
            farmer_id: Some(Id::new(1)),
            device_id: Some(Id::new(2)),
            farm_id: Some(Id::new(3)),
            field_id: Some(Id::new(4)),
            status: Some(AlertStatus::Acknowledged),
            severity: Some(AlertSeverity::High),
            alert_type: Some("weather".to_string()),
        };
        let mut query = list_query(&Scope::Farmer(Id::new(1)), &filter);
        let sql = query.build().sql().to_string();
        for fragment in [
            "a.farmer_id = $4",
            "a.device_id = $5",
            "a.farm_id = $6",
            "a.field_id = $7",
            "a.status = $8",
            "a.severity = $9",
            "a.alert_type = $10",
            "order by a.created_at desc",
        ] {
            assert!(sql.contains(fragment), "missing {fragment} in {sql}");
        }
    }

    #[test]
    fn update_statement_stamps_only_planned_timestamps() {
        let plan = AlertUpdatePlan {
            status: Some(AlertStatus::Acknowledged),
            stamp_acknowledged: true,
            ..Default::default()
        };
        let mut query = update_query(Id::new(9), &plan);
        let sql = query.build().sql().to_string();
        assert!(sql.starts_with("update alerts a set updated_at = now(), status = $1, acknowledged_at = now() where a.id = $2"));
        assert!(!sql.contains("resolved_at = now()"));
    }

    #[test]
    fn update_statement_stamps_resolution_for_terminal_statuses() {
        let plan = AlertUpdatePlan {
            status: Some(AlertStatus::Resolved),
            stamp_resolved: true,
            ..Default::default()
        };
        let mut query = update_query(Id::new(9), &plan);
        let sql = query.build().sql().to_string();
        assert!(sql.contains("resolved_at = now()"));
        assert!(!sql.contains("acknowledged_at = now()"));
    }

    #[test]
    fn update_statement_always_stamps_updated_at() {
        let plan = AlertUpdatePlan {
            message: Some("Aphids spreading to the east rows".to_string()),
            ..Default::default()
        };
        let mut query = update_query(Id::new(9), &plan);
        let sql = query.build().sql().to_string();
        assert!(sql.starts_with("update alerts a set updated_at = now(), message = $1"));
    }
}
