use super::{on_missing_reference, AccessClaims, ApiError, App};
use crate::authz;
use axum::http::StatusCode;
use models::{
    alerts::{AlertFilter, CreateAlert, UpdateAlert},
    Id,
};
use std::sync::Arc;
use verdant_sql::alerts::Alert;

/// `GET /alerts`: the caller's visibility scope intersected with any
/// explicit filters, newest first.
#[axum::debug_handler]
#[tracing::instrument(skip(app, claims), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn list_alerts(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Query(filter): axum::extract::Query<AlertFilter>,
) -> Result<axum::Json<Vec<Alert>>, ApiError> {
    let alerts = verdant_sql::alerts::fetch_alerts(&claims.scope(), &filter, &app.pg_pool).await?;
    Ok(axum::Json(alerts))
}

/// `POST /alerts`: manual creation, admin only. Severity defaults to
/// medium and status to new.
#[axum::debug_handler]
#[tracing::instrument(skip(app, claims, request), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn create_alert(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    super::Request(request): super::Request<CreateAlert>,
) -> Result<(StatusCode, axum::Json<Alert>), ApiError> {
    if !claims.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admins may create alerts.".to_string(),
        ));
    }

    let alert = verdant_sql::alerts::create_alert(claims.sub, &request, &app.pg_pool)
        .await
        .map_err(on_missing_reference(
            "A referenced farmer, device, farm, or field does not exist.",
        ))?;

    tracing::info!(alert_id = %alert.id, alert_type = %alert.alert_type, "created alert");
    Ok((StatusCode::CREATED, axum::Json(alert)))
}

#[axum::debug_handler]
#[tracing::instrument(skip(app, claims), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn get_alert(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Path(id): axum::extract::Path<Id>,
) -> Result<axum::Json<Alert>, ApiError> {
    authorize_alert_access(&app, &claims, id).await?;

    let alert = verdant_sql::alerts::fetch_alert(id, &app.pg_pool)
        .await?
        .ok_or_else(alert_not_found)?;
    Ok(axum::Json(alert))
}

/// `PUT /alerts/{id}`: the generic update. Farmers are limited to
/// status transitions into acknowledged or closed with no other field
/// changes; admins are unrestricted. The update is planned fully
/// before the single UPDATE statement runs, so a denial writes
/// nothing.
#[axum::debug_handler]
#[tracing::instrument(skip(app, claims, update), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn update_alert(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Path(id): axum::extract::Path<Id>,
    axum::Json(update): axum::Json<UpdateAlert>,
) -> Result<axum::Json<Alert>, ApiError> {
    authorize_alert_access(&app, &claims, id).await?;

    let plan = authz::plan_alert_update(&claims, &update)?;

    let alert = verdant_sql::alerts::update_alert(id, &plan, &app.pg_pool)
        .await?
        .ok_or_else(alert_not_found)?;

    tracing::info!(alert_id = %alert.id, status = %alert.status, "updated alert");
    Ok(axum::Json(alert))
}

/// Resolves the alert's ownership references and checks the caller
/// against them: 404 when the alert does not exist, 403 when it exists
/// but is unrelated to the calling farmer.
async fn authorize_alert_access(app: &App, claims: &AccessClaims, id: Id) -> Result<(), ApiError> {
    let owners = verdant_sql::alerts::fetch_alert_owners(id, &app.pg_pool)
        .await?
        .ok_or_else(alert_not_found)?;

    if !authz::can_access_alert(claims, &owners) {
        return Err(ApiError::Forbidden(
            "You do not have access to this alert.".to_string(),
        ));
    }
    Ok(())
}

fn alert_not_found() -> ApiError {
    ApiError::NotFound("Alert not found.".to_string())
}
