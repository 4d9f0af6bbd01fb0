//! `locationlog` - A minimal location-logging service
//!
//! This library provides the store, HTTP API and configuration for a service
//! that accepts device coordinates from browser clients, persists each
//! reading in `SQLite`, and returns the most recent one.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod server;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use location::{LocationRecord, NewLocation};
pub use logging::init_logging;
pub use server::HttpServer;
pub use storage::LocationStore;
