//! Core library for the `chef-load` CLI.
//!
//! Simulates a fleet of chef-client agents that check in with a Chef Server
//! on a schedule, so the server can be load-tested with realistic node
//! traffic. The primary user-facing interface is the `chef-load` binary;
//! library APIs may evolve with it.
pub mod agent;
pub mod api;
pub mod args;
pub mod attributes;
pub mod config;
pub mod cookbooks;
pub mod domain;
pub mod entry;
pub mod error;
pub mod fleet;
pub mod logger;
pub mod shutdown;
pub mod shutdown_handlers;
