//! Contact profile routes.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use inspect_core::FieldErrors;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::db::schema::Contact;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Deserialize)]
pub struct UpdatePhoneRequest {
    pub phone_number: Option<String>,
}

pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Contact>>> {
    let contacts = sqlx::query_as::<_, Contact>(
        "SELECT id, user_id, phone_number, created_at, updated_at
         FROM contacts WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(contacts))
}

pub async fn update_phone(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<UpdatePhoneRequest>,
) -> ApiResult<Json<Contact>> {
    let mut errors = FieldErrors::new();
    let phone = errors
        .require_str("phone_number", payload.phone_number.as_deref())
        .map(str::to_string);
    let Some(phone) = phone else {
        return Err(errors.into());
    };

    let now = Utc::now();
    // Registration always creates the contact row, but tolerate its absence.
    sqlx::query(
        "INSERT INTO contacts (user_id, phone_number, created_at, updated_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id) DO UPDATE SET phone_number = excluded.phone_number,
                                            updated_at = excluded.updated_at",
    )
    .bind(user.id)
    .bind(&phone)
    .bind(now)
    .bind(now)
    .execute(&state.db)
    .await?;

    let contact = sqlx::query_as::<_, Contact>(
        "SELECT id, user_id, phone_number, created_at, updated_at FROM contacts WHERE user_id = ?",
    )
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(contact))
}
