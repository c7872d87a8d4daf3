//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod catalog;
pub mod health;
pub mod middleware;
pub mod profiles;
pub mod router;
pub mod state;
pub mod types;

pub use middleware::RequireUser;
pub use router::{create_router, create_router_with_state};
pub use state::{AppState, UserServiceTrait};
