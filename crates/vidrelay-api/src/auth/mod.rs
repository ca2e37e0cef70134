//! Bearer token verification
//!
//! [`middleware::auth_middleware`] verifies the HS256 token on protected routes and stores an
//! [`AuthUser`] in the request extensions. Handlers take `AuthUser` as an extractor.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtVerifier;
pub use models::{AuthUser, JwtClaims};
