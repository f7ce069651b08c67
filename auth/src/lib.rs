mod error;
mod extract_token;
pub mod password;
mod request;
pub mod session;

pub use error::*;
pub use extract_token::invalid_message;
pub use request::*;
