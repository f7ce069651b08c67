use std::sync::Arc;

use thumbtier_auth::session::SessionManager;
use thumbtier_db::Store;
use thumbtier_storage::Operator;

use crate::auth::SessionBackend;

pub struct InnerState {
    pub store: Arc<dyn Store>,
    pub blobs: Operator,
    pub sessions: SessionManager<SessionBackend>,
    pub media_url_base: String,
    pub detect_content_type: bool,
}

impl InnerState {
    /// The link a client uses to fetch the object stored at `location`.
    pub fn media_url(&self, location: &str) -> String {
        format!("{}/{}", self.media_url_base.trim_end_matches('/'), location)
    }
}

pub type State = Arc<InnerState>;
