use super::{on_missing_reference, AccessClaims, ApiError, App};
use crate::authz;
use axum::http::StatusCode;
use models::{
    authorizations::Scope,
    farms::{CreateFarm, CreateField, FarmFilter},
    Id,
};
use std::sync::Arc;
use verdant_sql::farms::{Farm, Field};

/// `POST /farms`: a farmer creates farms for themselves; an admin
/// names the owning farmer explicitly.
#[axum::debug_handler]
#[tracing::instrument(skip(app, claims, request), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn create_farm(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    super::Request(request): super::Request<CreateFarm>,
) -> Result<(StatusCode, axum::Json<Farm>), ApiError> {
    let farmer_id = match claims.scope() {
        Scope::Unrestricted => request.farmer_id.ok_or_else(|| {
            ApiError::Validation("A farmer_id is required when an admin creates a farm.".to_string())
        })?,
        Scope::Farmer(own_id) => {
            if request.farmer_id.is_some_and(|requested| requested != own_id) {
                return Err(ApiError::Forbidden(
                    "Farmers may only create farms for themselves.".to_string(),
                ));
            }
            own_id
        }
    };

    let farm = verdant_sql::farms::create_farm(farmer_id, &request, &app.pg_pool)
        .await
        .map_err(on_missing_reference("The referenced farmer does not exist."))?;

    tracing::info!(farm_id = %farm.id, farmer_id = %farm.farmer_id, "created farm");
    Ok((StatusCode::CREATED, axum::Json(farm)))
}

#[axum::debug_handler]
#[tracing::instrument(skip(app, claims), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn list_farms(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Query(filter): axum::extract::Query<FarmFilter>,
) -> Result<axum::Json<Vec<Farm>>, ApiError> {
    let farmer_id = match claims.scope() {
        Scope::Unrestricted => filter.farmer_id,
        Scope::Farmer(own_id) => Some(own_id),
    };
    let farms = verdant_sql::farms::fetch_farms(farmer_id, &app.pg_pool).await?;
    Ok(axum::Json(farms))
}

#[axum::debug_handler]
#[tracing::instrument(skip(app, claims), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn get_farm(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Path(id): axum::extract::Path<Id>,
) -> Result<axum::Json<Farm>, ApiError> {
    let farm = fetch_authorized_farm(&app, &claims, id).await?;
    Ok(axum::Json(farm))
}

/// `POST /farms/{id}/fields`: adds a field to a farm the caller owns
/// (or any farm, for admins). Ownership of the field is transitively
/// the farm's farmer.
#[axum::debug_handler]
#[tracing::instrument(skip(app, claims, request), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn create_field(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Path(id): axum::extract::Path<Id>,
    super::Request(request): super::Request<CreateField>,
) -> Result<(StatusCode, axum::Json<Field>), ApiError> {
    let farm = fetch_authorized_farm(&app, &claims, id).await?;

    let field = verdant_sql::farms::create_field(farm.id, &request, &app.pg_pool).await?;

    tracing::info!(field_id = %field.id, farm_id = %farm.id, crop_type = %field.crop_type, "created field");
    Ok((StatusCode::CREATED, axum::Json(field)))
}

#[axum::debug_handler]
#[tracing::instrument(skip(app, claims), fields(user_id = %claims.sub), err(level = tracing::Level::WARN))]
pub async fn list_fields(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    axum::Extension(claims): axum::Extension<AccessClaims>,
    axum::extract::Path(id): axum::extract::Path<Id>,
) -> Result<axum::Json<Vec<Field>>, ApiError> {
    let farm = fetch_authorized_farm(&app, &claims, id).await?;
    let fields = verdant_sql::farms::fetch_fields(farm.id, &app.pg_pool).await?;
    Ok(axum::Json(fields))
}

/// Fetches a farm and checks the caller may act on it: 404 when it
/// does not exist, 403 when it belongs to another farmer.
async fn fetch_authorized_farm(app: &App, claims: &AccessClaims, id: Id) -> Result<Farm, ApiError> {
    let farm = verdant_sql::farms::fetch_farm(id, &app.pg_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farm not found.".to_string()))?;

    if !authz::owns(claims, Some(farm.farmer_id)) {
        return Err(ApiError::Forbidden(
            "You do not have access to this farm.".to_string(),
        ));
    }
    Ok(farm)
}
