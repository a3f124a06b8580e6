//! Contact CRUD routes — one contact profile per user.
//!
//! All three fields are required for delivery and validated here, before
//! persistence; the dispatcher itself trusts whatever profile it is given.

use axum::extract::State;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use herald_common::error::AppError;
use herald_common::types::ContactRecord;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\d{10,12}$").expect("valid phone regex"));

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contacts", post(create_contacts))
        .route("/api/contacts", get(get_contacts))
        .route("/api/contacts", patch(update_contacts))
        .route("/api/contacts", delete(delete_contacts))
}

/// Request body for creating a contact profile.
#[derive(Debug, Deserialize)]
pub struct CreateContactsRequest {
    pub email: String,
    pub phone: String,
    pub telegram_chat_id: String,
}

/// Request body for a partial contact update.
#[derive(Debug, Deserialize)]
pub struct UpdateContactsRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub telegram_chat_id: Option<String>,
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(AppError::Validation(
            "Email is required to receive notifications by mail".to_string(),
        ));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), AppError> {
    if phone.trim().is_empty() {
        return Err(AppError::Validation(
            "Phone number is required to receive notifications by SMS".to_string(),
        ));
    }
    if !PHONE_RE.is_match(phone) {
        return Err(AppError::Validation(
            "Phone number must be in the format '+79991234567' or '89991234567'".to_string(),
        ));
    }
    Ok(())
}

fn validate_chat_id(chat_id: &str) -> Result<(), AppError> {
    if chat_id.trim().is_empty() {
        return Err(AppError::Validation(
            "Telegram chat ID is required to receive notifications in Telegram".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/contacts — Create the contact profile for the authenticated user.
async fn create_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateContactsRequest>,
) -> Result<Json<ContactRecord>, AppError> {
    validate_email(&req.email)?;
    validate_phone(&req.phone)?;
    validate_chat_id(&req.telegram_chat_id)?;

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM user_contacts WHERE user_id = $1")
            .bind(auth.user_id)
            .fetch_optional(&state.pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Validation(
            "Contacts already exist for this user; use PATCH to update them".to_string(),
        ));
    }

    let contacts: ContactRecord = sqlx::query_as(
        r#"
        INSERT INTO user_contacts (id, user_id, email, phone, telegram_chat_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.telegram_chat_id)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(user_id = %auth.user_id, "Contact profile created");

    Ok(Json(contacts))
}

/// GET /api/contacts — Fetch the authenticated user's contact profile.
async fn get_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ContactRecord>, AppError> {
    let contacts: ContactRecord =
        sqlx::query_as("SELECT * FROM user_contacts WHERE user_id = $1")
            .bind(auth.user_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Contacts not found".to_string()))?;

    Ok(Json(contacts))
}

/// PATCH /api/contacts — Partially update the contact profile.
async fn update_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateContactsRequest>,
) -> Result<Json<ContactRecord>, AppError> {
    if let Some(email) = &req.email {
        validate_email(email)?;
    }
    if let Some(phone) = &req.phone {
        validate_phone(phone)?;
    }
    if let Some(chat_id) = &req.telegram_chat_id {
        validate_chat_id(chat_id)?;
    }

    let contacts: ContactRecord = sqlx::query_as(
        r#"
        UPDATE user_contacts
        SET email = COALESCE($1, email),
            phone = COALESCE($2, phone),
            telegram_chat_id = COALESCE($3, telegram_chat_id),
            updated_at = NOW()
        WHERE user_id = $4
        RETURNING *
        "#,
    )
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.telegram_chat_id)
    .bind(auth.user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Contacts not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, "Contact profile updated");

    Ok(Json(contacts))
}

/// DELETE /api/contacts — Remove the contact profile.
async fn delete_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query("DELETE FROM user_contacts WHERE user_id = $1")
        .bind(auth.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Contacts not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, "Contact profile deleted");

    Ok(Json(serde_json::json!({"deleted": true})))
}
