//! Notification CRUD routes and the send endpoint.

use axum::extract::{Path, State};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use herald_common::error::AppError;
use herald_common::types::{ContactRecord, Notification};
use herald_dispatch::{
    ContactProfile, DispatchConfig, DispatchError, DispatchOutcome, Dispatcher, Message,
};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", post(create_notification))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}", get(get_notification))
        .route("/api/notifications/{id}", patch(update_notification))
        .route("/api/notifications/{id}", delete(delete_notification))
        .route("/api/notifications/send", post(send_notification))
}

/// Request body for creating or sending a notification.
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub subject: String,
    pub message: String,
}

/// Request body for a partial notification update.
#[derive(Debug, Deserialize)]
pub struct UpdateNotificationRequest {
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// POST /api/notifications — Store a notification without sending it.
async fn create_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<Json<Notification>, AppError> {
    if req.subject.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::Validation(
            "Both subject and message are required".to_string(),
        ));
    }

    let notification: Notification = sqlx::query_as(
        r#"
        INSERT INTO notifications (id, user_id, subject, message)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(&req.subject)
    .bind(&req.message)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(notification))
}

/// GET /api/notifications — List the authenticated user's notifications.
async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications: Vec<Notification> = sqlx::query_as(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(notifications))
}

/// GET /api/notifications/:id — Fetch one of the user's notifications.
async fn get_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification: Notification =
        sqlx::query_as("SELECT * FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(auth.user_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

    Ok(Json(notification))
}

/// PATCH /api/notifications/:id — Update a notification's subject or message.
async fn update_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNotificationRequest>,
) -> Result<Json<Notification>, AppError> {
    if matches!(&req.subject, Some(s) if s.trim().is_empty())
        || matches!(&req.message, Some(m) if m.trim().is_empty())
    {
        return Err(AppError::Validation(
            "Subject and message must not be empty".to_string(),
        ));
    }

    let notification: Notification = sqlx::query_as(
        r#"
        UPDATE notifications
        SET subject = COALESCE($1, subject),
            message = COALESCE($2, message)
        WHERE id = $3 AND user_id = $4
        RETURNING *
        "#,
    )
    .bind(&req.subject)
    .bind(&req.message)
    .bind(id)
    .bind(auth.user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

    Ok(Json(notification))
}

/// DELETE /api/notifications/:id — Delete one of the user's notifications.
async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Notification {} not found", id)));
    }

    Ok(Json(serde_json::json!({"deleted": true})))
}

/// POST /api/notifications/send — Persist a notification and fan it out
/// through the delivery channels.
///
/// The row is written before the dispatch so a hard delivery failure leaves
/// an unsent notification behind; `is_sent` flips to true only on success.
async fn send_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if req.subject.trim().is_empty() || req.message.trim().is_empty() {
        return Err(AppError::Validation(
            "Both subject and message are required".to_string(),
        ));
    }

    let notification: Notification = sqlx::query_as(
        r#"
        INSERT INTO notifications (id, user_id, subject, message)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.user_id)
    .bind(&req.subject)
    .bind(&req.message)
    .fetch_one(&state.pool)
    .await?;

    let contacts: Option<ContactRecord> =
        sqlx::query_as("SELECT * FROM user_contacts WHERE user_id = $1")
            .bind(auth.user_id)
            .fetch_optional(&state.pool)
            .await?;
    let profile = contacts.map(|c| ContactProfile {
        email: c.email,
        phone: c.phone,
        telegram_chat_id: c.telegram_chat_id,
    });

    let config = DispatchConfig::from_app_config(&state.config);
    let dispatcher =
        Dispatcher::new(profile, &config, state.http.clone()).map_err(|e| match e {
            DispatchError::ContactsMissing => AppError::Validation(e.to_string()),
            other => AppError::Delivery(other.to_string()),
        })?;

    let message = Message {
        subject: req.subject,
        body: req.message,
    };

    match dispatcher.dispatch(&message).await {
        Ok(DispatchOutcome::Sent(channel)) => {
            sqlx::query("UPDATE notifications SET is_sent = true WHERE id = $1")
                .bind(notification.id)
                .execute(&state.pool)
                .await?;

            tracing::info!(
                user_id = %auth.user_id,
                notification_id = %notification.id,
                %channel,
                "Notification sent"
            );

            Ok(Json(serde_json::json!({
                "status": "Notification sent successfully",
                "channel": channel.to_string(),
            })))
        }
        Ok(DispatchOutcome::NotSent) => Err(AppError::Delivery(
            "Notification could not be sent through any channel".to_string(),
        )),
        Err(e) => Err(AppError::Delivery(e.to_string())),
    }
}
