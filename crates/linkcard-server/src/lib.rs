//! HTTP service for the linkcard profile page.
//!
//! Serves the public card, the two data endpoints used by the page
//! (fetch-all and upsert-all), and a session-based editor API behind the
//! shared admin password. This crate contains the server framework, API
//! schema types, error handling, and route definitions.

pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
