use crate::{config::Config, services::session_manager::SessionManager};

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub config: Config,
}

impl AppState {
    pub fn new(sessions: SessionManager, config: Config) -> Self {
        Self { sessions, config }
    }
}
