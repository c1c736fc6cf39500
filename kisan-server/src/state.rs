use std::path::PathBuf;
use std::sync::Arc;

use crate::assistant::Assistant;
use crate::db::Database;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
    pub assistant: Arc<dyn Assistant>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(
        db: Database,
        session_ttl_days: i64,
        assistant: Arc<dyn Assistant>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        let session_manager = SessionManager::new(db.clone(), session_ttl_days);
        Self {
            db,
            session_manager,
            assistant,
            upload_dir: upload_dir.into(),
        }
    }

    /// Get authenticated user ID from session token
    pub fn get_authenticated_user_id_from_token(&self, token: &str) -> Option<uuid::Uuid> {
        self.session_manager.validate_session(token).ok()
    }
}
