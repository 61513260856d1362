//! Configuration loading and application.
mod apply;
mod loader;
mod sample;
pub mod types;


pub use apply::{LoadSettings, build_settings};
pub use loader::{check_client_key, load_config};
pub use sample::SAMPLE_CONFIG;

pub(crate) use loader::load_config_file;
