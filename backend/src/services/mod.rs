pub mod session_manager;
pub mod session_token;

pub use session_manager::{RevokeOutcome, SessionError, SessionManager};
pub use session_token::{issue_session_token, IssuedSession};
