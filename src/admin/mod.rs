// Admin module - credential checks, token sessions, admin JSON API
pub mod error;
pub mod handlers;
pub mod session;

pub use error::AdminError;
pub use session::{AdminConfig, Session, SessionStore};

#[cfg(test)]
mod tests;
