use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::ProfileFields;
use crate::session::SESSION_HEADER;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub username: String,
}

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if req.password != req.confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    state
        .store
        .lock()
        .unwrap()
        .create(&req.username, &req.password, req.profile)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Account created successfully" })),
    ))
}

/// POST /api/v1/auth/login
/// Failure is one indistinct 401 whether the username exists or not.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let verified = state.store.lock().unwrap().verify(&req.username, &req.password);
    if !verified {
        return Err(AppError::Unauthorized);
    }

    let token = state.sessions.open(&req.username);
    Ok(Json(LoginResponse {
        token,
        username: req.username,
    }))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or(AppError::Unauthorized)?;

    state.sessions.close(token);
    Ok(StatusCode::NO_CONTENT)
}
