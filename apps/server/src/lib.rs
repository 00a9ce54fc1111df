//! Patient records REST server
//!
//! CRUD over the `pacientes` resource behind bearer-token authentication,
//! backed by Postgres (or an in-process store for tests), with a one-time CSV
//! bootstrap import at startup.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod services;
pub mod startup;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
