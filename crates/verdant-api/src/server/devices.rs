use super::{on_missing_reference, AccessClaims, ApiError, App};
use crate::authz;
use axum::http::StatusCode;
use models::{
    devices::{CreateDevice, DeviceFilter, UpdateDevice},
    Id,
};
use std::sync::Arc;
use verdant_sql::devices::Device;

/// `POST /devices`: registration of a device is an admin operation.
#[axum::debug_handler]
#[tracing::instrument(skip(app, claims, request), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn create_device(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    super::Request(request): super::Request<CreateDevice>,
) -> Result<(StatusCode, axum::Json<Device>), ApiError> {
    require_admin(&claims, "Only admins may register devices.")?;

    let device = verdant_sql::devices::create_device(&request, &app.pg_pool)
        .await
        .map_err(|err| {
            if verdant_sql::is_unique_violation(&err) {
                ApiError::Conflict("A device with this serial number already exists.".to_string())
            } else if verdant_sql::is_foreign_key_violation(&err) {
                ApiError::NotFound("The referenced farm or farmer does not exist.".to_string())
            } else {
                err.into()
            }
        })?;

    tracing::info!(device_id = %device.id, serial_number = %device.serial_number, "registered device");
    Ok((StatusCode::CREATED, axum::Json(device)))
}

#[axum::debug_handler]
#[tracing::instrument(skip(app, claims), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn list_devices(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Query(filter): axum::extract::Query<DeviceFilter>,
) -> Result<axum::Json<Vec<Device>>, ApiError> {
    let devices =
        verdant_sql::devices::fetch_devices(&claims.scope(), &filter, &app.pg_pool).await?;
    Ok(axum::Json(devices))
}

#[axum::debug_handler]
#[tracing::instrument(skip(app, claims), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn get_device(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Path(id): axum::extract::Path<Id>,
) -> Result<axum::Json<Device>, ApiError> {
    let device = verdant_sql::devices::fetch_device(id, &app.pg_pool)
        .await?
        .ok_or_else(device_not_found)?;

    if !authz::owns(&claims, device.farmer_id) {
        return Err(ApiError::Forbidden(
            "You do not have access to this device.".to_string(),
        ));
    }
    Ok(axum::Json(device))
}

/// `PUT /devices/{id}`: admin-only status and assignment changes.
/// Status values come from the closed device-status set.
#[axum::debug_handler]
#[tracing::instrument(skip(app, claims, update), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn update_device(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Path(id): axum::extract::Path<Id>,
    axum::Json(update): axum::Json<UpdateDevice>,
) -> Result<axum::Json<Device>, ApiError> {
    require_admin(&claims, "Only admins may update devices.")?;

    if update.is_empty() {
        return Err(ApiError::Validation("Nothing to update.".to_string()));
    }

    let device = verdant_sql::devices::update_device(id, &update, &app.pg_pool)
        .await
        .map_err(on_missing_reference(
            "The referenced farm or farmer does not exist.",
        ))?
        .ok_or_else(device_not_found)?;

    tracing::info!(device_id = %device.id, status = %device.status, "updated device");
    Ok(axum::Json(device))
}

/// `DELETE /devices/{id}`: hard delete, admin only.
#[axum::debug_handler]
#[tracing::instrument(skip(app, claims), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn delete_device(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Path(id): axum::extract::Path<Id>,
) -> Result<StatusCode, ApiError> {
    require_admin(&claims, "Only admins may delete devices.")?;

    if !verdant_sql::devices::delete_device(id, &app.pg_pool).await? {
        return Err(device_not_found());
    }
    tracing::info!(device_id = %id, "deleted device");
    Ok(StatusCode::NO_CONTENT)
}

fn require_admin(claims: &AccessClaims, message: &str) -> Result<(), ApiError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(message.to_string()))
    }
}

fn device_not_found() -> ApiError {
    ApiError::NotFound("Device not found.".to_string())
}
