use chrono::{DateTime, Utc};
use models::{users::RegisterUser, Id, Role};
use serde::Serialize;
use sqlx::PgPool;

/// A row of the `users` table. The password hash never serializes into
/// API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub role: Role,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str =
    "id, name, role, email, phone_number, password_hash, address, latitude, longitude, created_at";

pub async fn create_user(
    registration: &RegisterUser,
    password_hash: &str,
    pool: &PgPool,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(&format!(
        r#"insert into users (name, role, email, phone_number, password_hash, address, latitude, longitude)
        values ($1, $2, $3, $4, $5, $6, $7, $8)
        returning {USER_COLUMNS}"#
    ))
    .bind(&registration.name)
    .bind(registration.role)
    .bind(&registration.email)
    .bind(&registration.phone_number)
    .bind(password_hash)
    .bind(&registration.address)
    .bind(registration.latitude)
    .bind(registration.longitude)
    .fetch_one(pool)
    .await
}

/// Looks up an identity by its login key: the email an admin registered
/// with, or the phone number a farmer registered with.
pub async fn fetch_user_by_login_key(login_key: &str, pool: &PgPool) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!(
        r#"select {USER_COLUMNS} from users
        where (role = 'admin' and email = $1) or (role = 'farmer' and phone_number = $1)"#
    ))
    .bind(login_key)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_user(id: Id, pool: &PgPool) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("select {USER_COLUMNS} from users where id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod test {
    use super::User;
    use chrono::TimeZone;
    use models::{Id, Role};

    #[test]
    fn password_hash_never_serializes() {
        let user = User {
            id: Id::new(3),
            name: "Rosa Vance".to_string(),
            role: Role::Farmer,
            email: None,
            phone_number: Some("+15550100".to_string()),
            password_hash: "$argon2id$v=19$secret".to_string(),
            address: None,
            latitude: Some(41.2),
            longitude: Some(-87.5),
            created_at: chrono::Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap(),
        };
        let encoded = serde_json::to_string(&user).unwrap();
        assert!(!encoded.contains("argon2"));
        assert!(!encoded.contains("password_hash"));
        assert!(encoded.contains("+15550100"));
    }
}
