pub mod cookies;
pub mod jwt;
pub mod request_meta;
pub mod token;

pub use jwt::*;
pub use token::*;
