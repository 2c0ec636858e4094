use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::Session;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/verify", post(verify_otp))
        .route("/auth/admin", post(admin_login))
        .route("/auth/logout", post(logout))
}

/* ---------- ONE-TIME CODES ---------- */

// POST /api/auth/send-otp
#[derive(Debug, Deserialize, Validate)]
struct SendOtpRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOtpResponse {
    message: &'static str,
    expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    otp: Option<String>,
}

async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, AppError> {
    let req = SendOtpRequest {
        email: req.email.trim().to_string(),
    };
    if req.email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    req.validate()?;

    let issued = state.auth.request_code(&req.email).await?;

    Ok(Json(SendOtpResponse {
        message: "OTP sent successfully",
        expires_at: issued.expires_at,
        otp: state.config.auth.expose_otp.then_some(issued.code),
    }))
}

// POST /api/auth/verify
#[derive(Debug, Deserialize, Validate)]
struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    otp: String,
}

async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<Session>, AppError> {
    req.validate()?;
    let session = state.auth.verify_code(&req.email, &req.otp).await?;
    Ok(Json(session))
}

/* ---------- ADMIN & LOGOUT ---------- */

// POST /api/auth/admin
#[derive(Debug, Deserialize)]
struct AdminLoginRequest {
    username: String,
    password: String,
}

async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state.auth.admin_login(req.username.trim(), &req.password).await?;
    info!("Admin session opened");
    Ok(Json(session))
}

// POST /api/auth/logout
async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Json<serde_json::Value> {
    state.auth.logout(&user.token).await;
    // The wizard is shared by every device of the principal.
    if !state.auth.is_signed_in(&user.principal.id).await {
        state.sessions.remove(&user.principal.id).await;
    }
    Json(serde_json::json!({ "message": "Logged out" }))
}
