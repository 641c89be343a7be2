use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::recommender::RecommenderClient;
use crate::session::SessionStore;
use crate::sheets::ProfileMirror;
use crate::store::CredentialStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// In-memory credential mapping behind a lock; never held across an
    /// await (file writes are synchronous and the file is small).
    pub store: Arc<Mutex<CredentialStore>>,
    pub sessions: Arc<SessionStore>,
    pub recommender: RecommenderClient,
    /// Pluggable spreadsheet mirror; tests swap in an in-memory fake.
    pub mirror: Arc<dyn ProfileMirror>,
    pub config: Config,
}
