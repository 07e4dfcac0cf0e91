pub mod auth;

pub use auth::{auth_middleware, is_staff_user, AppState, AuthUser};
