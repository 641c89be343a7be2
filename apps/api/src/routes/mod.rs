pub mod auth;
pub mod health;
pub mod profile;
pub mod recommend;

use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;

/// Resolves the request's session header to a username, or rejects with 401.
pub(crate) fn require_user(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    state
        .sessions
        .username_from_headers(headers)
        .ok_or(AppError::Unauthorized)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/signup", post(auth::handle_signup))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).put(profile::handle_save_profile),
        )
        .route(
            "/api/v1/recommendations",
            post(recommend::handle_recommendations),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use crate::config::Config;
    use crate::recommender::RecommenderClient;
    use crate::session::SessionStore;
    use crate::sheets::testing::FakeMirror;
    use crate::state::AppState;
    use crate::store::CredentialStore;

    pub fn test_config() -> Config {
        Config {
            webhook_url: "http://webhook.invalid/recs".to_string(),
            users_file: "users.json".to_string(),
            spreadsheet_id: "sheet-id".to_string(),
            sheets_api_token: "token".to_string(),
            user_sheet_name: "Sheet1".to_string(),
            course_sheet_name: "course_recommendations".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    /// App state over a temp-dir store and an in-memory mirror. The
    /// returned mirror handle is the same one the state holds.
    pub fn test_state() -> (tempfile::TempDir, AppState, Arc<FakeMirror>) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::load(dir.path().join("users.json")).unwrap();
        let mirror = Arc::new(FakeMirror::default());

        let state = AppState {
            store: Arc::new(Mutex::new(store)),
            sessions: Arc::new(SessionStore::new()),
            recommender: RecommenderClient::new("http://webhook.invalid/recs".to_string()),
            mirror: mirror.clone(),
            config: test_config(),
        };
        (dir, state, mirror)
    }
}
