pub mod active_session;
pub mod memory_session;

pub use active_session::{PgSessionStore, SessionStore, SessionStoreError};
pub use memory_session::InMemorySessionStore;
