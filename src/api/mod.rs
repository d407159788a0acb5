//! HTTP API.

mod routes;
mod types;

pub use routes::serve;
