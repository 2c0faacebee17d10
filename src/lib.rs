//! Paginated video search sessions over pluggable extraction providers,
//! with an HTTP surface for search, suggestions and stream resolution.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
