//! Middleware module
//!
//! Contains Tower middleware for proxy authentication.

pub mod auth;
