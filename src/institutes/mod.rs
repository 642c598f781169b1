// Institutes module
// Public institute directory with authenticated writes

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
