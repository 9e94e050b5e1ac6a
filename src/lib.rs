// Public API for integration tests and potential library usage

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod roster;
pub mod selector;
pub mod state;
pub mod store;
pub mod types;
