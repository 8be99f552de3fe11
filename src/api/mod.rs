//! HTTP API for the dice game service
//!
//! Play rounds, verify commit-reveal rounds, and read round history.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{create_app, ApiServer};
