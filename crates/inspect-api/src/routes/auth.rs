//! Registration, login, token verification, and logout.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use inspect_core::FieldErrors;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{
    hash_password, new_salt, new_token_key, resolve_token, token_from_headers, verify_password,
};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub first_name: String,
}

/// Create the account, its contact profile, and a token in one transaction.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let mut errors = FieldErrors::new();
    let username = errors
        .require_str("username", payload.username.as_deref())
        .map(str::to_string);
    let email = errors
        .require_str("email", payload.email.as_deref())
        .map(str::to_string);
    let password = errors
        .require_str("password", payload.password.as_deref())
        .map(str::to_string);
    let confirm = errors
        .require_str("confirm_password", payload.confirm_password.as_deref())
        .map(str::to_string);
    let phone = errors
        .require_str("phone_number", payload.phone_number.as_deref())
        .map(str::to_string);

    if let (Some(password), Some(confirm)) = (&password, &confirm) {
        if password != confirm {
            errors.add("confirm_password", "Passwords do not match");
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }
    let (username, email, password, phone) = (
        username.unwrap_or_default(),
        email.unwrap_or_default(),
        password.unwrap_or_default(),
        phone.unwrap_or_default(),
    );

    let taken: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(&username)
        .fetch_optional(&state.db)
        .await?;
    if taken.is_some() {
        let mut errors = FieldErrors::new();
        errors.add("username", "a user with that username already exists");
        return Err(errors.into());
    }

    let now = Utc::now();
    let salt = new_salt();
    let password_hash = hash_password(&salt, &password);
    let token = new_token_key();

    // Account, contact, and token persist together or not at all.
    let mut tx = state.db.begin().await?;
    let user_id = sqlx::query(
        "INSERT INTO users (username, email, password_hash, password_salt, first_name, last_name, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(&salt)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    sqlx::query(
        "INSERT INTO contacts (user_id, phone_number, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(&phone)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO auth_tokens (key, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("registered user {username}");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            token,
            user: UserSummary {
                id: user_id,
                username,
                email,
                first_name: payload.first_name,
                last_name: payload.last_name,
            },
        }),
    ))
}

/// Validate credentials and return the user's token, minting one on first
/// login. One token per user.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (username, password) = match (payload.username.as_deref(), payload.password.as_deref()) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(ApiError::bad_request(
                "Please provide both username and password",
            ))
        }
    };

    info!("login attempt for user {username}");

    let user: Option<(i64, String, String, String, String)> = sqlx::query_as(
        "SELECT id, username, first_name, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(&state.db)
    .await?;

    let (user_id, username, first_name) = match user {
        Some((id, username, first_name, hash, salt))
            if verify_password(&salt, password, &hash) =>
        {
            (id, username, first_name)
        }
        _ => {
            warn!("failed login for user {username}");
            return Err(ApiError::unauthorized("Invalid Credentials"));
        }
    };

    let existing: Option<(String,)> = sqlx::query_as("SELECT key FROM auth_tokens WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;

    let token = match existing {
        Some((key,)) => key,
        None => {
            let key = new_token_key();
            sqlx::query("INSERT INTO auth_tokens (key, user_id, created_at) VALUES (?, ?, ?)")
                .bind(&key)
                .bind(user_id)
                .bind(Utc::now())
                .execute(&state.db)
                .await?;
            key
        }
    };

    Ok(Json(LoginResponse {
        token,
        user_id,
        username,
        first_name,
    }))
}

/// Check the `Authorization: Token <key>` header and report its user.
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let key = token_from_headers(&headers)
        .ok_or_else(|| ApiError::unauthorized("No token provided"))?;
    let user = resolve_token(&state.db, key)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;
    Ok(Json(json!({
        "status": "Token is valid",
        "user": user.username,
    })))
}

/// Hard-revoke the caller's token.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let key = token_from_headers(&headers)
        .ok_or_else(|| ApiError::bad_request("No token provided"))?;

    let deleted = sqlx::query("DELETE FROM auth_tokens WHERE key = ?")
        .bind(key)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(ApiError::bad_request("Invalid token"));
    }

    info!("token revoked");
    Ok(Json(json!({ "status": "Successfully logged out" })))
}
