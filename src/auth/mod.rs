// Authentication module
// JWT bearer authentication, credential store and the auth gate extractor

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, me_handler, register_handler, update_profile_handler};
pub use middleware::AuthenticatedUser;
pub use models::{
    AuthResponse, LoginRequest, RegisterRequest, Role, UpdateProfileRequest, User, UserSummary,
};
pub use repository::{InMemoryUserStore, PgUserRepository, UserStore};
pub use service::AuthService;
pub use token::TokenService;
