//! Authentication infrastructure: session JWTs and static API keys

mod api_key;
mod jwt;

pub use api_key::ApiKeyVerifier;
pub use jwt::{IssuedToken, JwtClaims, JwtConfig, JwtGenerator, JwtService};
