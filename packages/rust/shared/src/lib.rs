//! Error model and configuration shared by every mirrordocs crate.
//!
//! This crate is the foundation depended on by all other mirrordocs crates.
//! It provides:
//! - [`CrawlError`] — the unified ambient error type
//! - [`AppConfig`] / [`CrawlerConfig`] — configuration and config loading

pub mod config;
pub mod error;

pub use config::{
    AppConfig, CrawlerConfig, CrawlerSettings, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{CrawlError, Result};
