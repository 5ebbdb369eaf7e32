//! mdr: search aggregation service for C and C++ reference material.
//!
//! Wraps [`mdr_search`] in an HTTP API:
//! - `GET /search/{query}` fans a query out to the cppreference and Google
//!   source chains and returns one result list per source
//! - `POST /api/feedback` accepts feedback from signed-in users
//! - `GET /api/auth/login` and `DELETE /api/auth/logout` inspect and expire
//!   the session cookie
//!
//! Sessions are stateless signed tokens carried in a cookie, see
//! [`session`].

pub mod auth;
pub mod config;
pub mod error;
pub mod feedback;
pub mod server;
pub mod session;

pub use config::AppConfig;
pub use error::{Result, ServerError};
pub use server::{AppState, SearchServer};
