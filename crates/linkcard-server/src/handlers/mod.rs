//! HTTP handler modules for the linkcard API.
//!
//! Each sub-module implements thin handlers that parse requests, delegate
//! to [`ProfileService`](crate::service::ProfileService), and return JSON
//! or HTML responses. No business logic lives in handlers.

pub mod admin;
pub mod data;
pub mod page;
