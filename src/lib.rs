// Library exports for instalite
// The binary and the integration tests both drive the client through these

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod view;
