//! # Campus marketplace server
//! The REST front end of the marketplace. It is responsible for:
//! * Authenticating callers with bearer JWTs and gating routes by role.
//! * Translating HTTP requests into calls on the engine APIs, and engine errors into HTTP status codes.
//! * Running the seller inactivity lock on a timer.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: liveness check.
//! * `/api/shop/products[/{id}]`: the public storefront.
//! * `/api/orders`, `/api/orders/me`: checkout and order history for customers.
//! * `/api/seller/products[/{id}]`, `/api/seller/orders[/{id}]`: the seller dashboard.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod lock_worker;
pub mod middleware;
pub mod notifications;
pub mod routes;
pub mod server;
