//! Runs synchronous, environ-based web applications behind an API Gateway
//! proxy integration.
//!
//! [`handler::respond`] turns a [`models::GatewayEvent`] into an
//! [`environ::Environ`], calls the [`app::Application`], and renders what it
//! registered and returned into a [`models::GatewayResponse`].

pub mod app;
pub mod config;
pub mod environ;
pub mod handler;
pub mod models;
pub mod start_response;
