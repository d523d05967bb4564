use super::{on_unique_violation, ApiError, App};
use crate::auth::password;
use axum::http::StatusCode;
use models::users::RegisterUser;
use std::sync::Arc;
use verdant_sql::users::User;

#[axum::debug_handler]
#[tracing::instrument(skip_all, err(level = tracing::Level::WARN))]
pub async fn register(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    super::Request(registration): super::Request<RegisterUser>,
) -> Result<(StatusCode, axum::Json<User>), ApiError> {
    // Role determines which login key is required: email for admins,
    // phone number for farmers.
    if let Some(message) = registration.login_key_error() {
        return Err(ApiError::Validation(message.to_string()));
    }

    let password_hash = password::hash_password(&registration.password).map_err(|error| {
        tracing::error!(?error, "failed to hash password");
        ApiError::Internal(anyhow::anyhow!("password hashing failed"))
    })?;

    let user = verdant_sql::users::create_user(&registration, &password_hash, &app.pg_pool)
        .await
        .map_err(on_unique_violation(
            "An account with this login key already exists.",
        ))?;

    tracing::info!(user_id = %user.id, role = %user.role, "registered user");
    Ok((StatusCode::CREATED, axum::Json(user)))
}
