pub mod active_session;

pub use active_session::*;
