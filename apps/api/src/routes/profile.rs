use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::models::user::ProfileFields;
use crate::routes::require_user;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    #[serde(flatten)]
    pub profile: ProfileFields,
    pub total_users: usize,
}

#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    #[serde(flatten)]
    pub profile: ProfileFields,
}

#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    /// False when the local write succeeded but the spreadsheet mirror
    /// failed; the two are allowed to diverge.
    pub synced: bool,
    pub message: String,
}

/// GET /api/v1/profile
/// Stored fields for the session user, used to prefill the form.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, AppError> {
    let username = require_user(&state, &headers)?;

    let store = state.store.lock().unwrap();
    Ok(Json(ProfileResponse {
        profile: store.profile(&username),
        total_users: store.len(),
        username,
    }))
}

/// PUT /api/v1/profile
/// Saves locally first, then mirrors to the spreadsheet best-effort.
pub async fn handle_save_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveProfileRequest>,
) -> Result<Json<SaveProfileResponse>, AppError> {
    let username = require_user(&state, &headers)?;

    let p = &req.profile;
    if p.gmail.is_empty() || p.skills.is_empty() || p.education.is_empty() || p.interests.is_empty()
    {
        return Err(AppError::Validation(
            "All fields must be filled to save".to_string(),
        ));
    }

    // Local write first; the lock is released before the outbound call.
    {
        let mut store = state.store.lock().unwrap();
        store.update_profile(&username, req.profile.clone())?;
    }

    match state.mirror.upsert_profile_row(&username, &req.profile).await {
        Ok(()) => Ok(Json(SaveProfileResponse {
            synced: true,
            message: "Profile saved and synced".to_string(),
        })),
        Err(e) => {
            warn!("Profile sync failed for {username}: {e}");
            Ok(Json(SaveProfileResponse {
                synced: false,
                message: "Profile saved locally, but failed to sync".to_string(),
            }))
        }
    }
}
