//! # Socialnet API Server Library
//!
//! HTTP surface of the Socialnet backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: Route handlers
//! - `uploads`: Multipart parsing and image storage
//! - `views`: View models handed to the page renderer

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod uploads;
pub mod views;
