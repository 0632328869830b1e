//! # Meetuj API Server Library
//!
//! ## Modules
//!
//! - `app`: application state and router
//! - `config`: environment configuration
//! - `error`: HTTP error mapping
//! - `routes`: HTTP handlers
//! - `storage`: profile picture files
//! - `ws`: the WebSocket mirror of the API

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod storage;
pub mod ws;
