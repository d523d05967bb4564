use super::{ApiError, App};
use crate::auth::password;
use anyhow::Context;
use models::users::LoginRequest;
use std::sync::Arc;
use verdant_sql::users::User;

#[derive(Debug, serde::Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[axum::debug_handler]
#[tracing::instrument(skip_all, err(level = tracing::Level::WARN))]
pub async fn login(
    axum::extract::State(app): axum::extract::State<Arc<App>>,
    super::Request(request): super::Request<LoginRequest>,
) -> Result<axum::Json<LoginResponse>, ApiError> {
    let Some(login_key) = request.login_key() else {
        return Err(ApiError::Validation(
            "An email or phone number is required.".to_string(),
        ));
    };

    let user = verdant_sql::users::fetch_user_by_login_key(login_key, &app.pg_pool).await?;

    // A missing identity and a wrong password produce the same failure,
    // and both arms verify one hash, so nothing distinguishes them.
    let user = match user {
        Some(user) if password::verify_password(&request.password, &user.password_hash) => user,
        Some(_) => return Err(invalid_credentials()),
        None => {
            let _ = password::verify_password(&request.password, password::dummy_hash());
            return Err(invalid_credentials());
        }
    };

    let token = app
        .tokens
        .issue(user.id, user.role, login_key)
        .context("failed to sign access token")?;

    Ok(axum::Json(LoginResponse { token, user }))
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated("Invalid credentials.".to_string())
}
