//! Configuration Module
//!
//! Environment-driven configuration for the prediction client.

mod settings;

pub use settings::{
    ClientConfig, ConfigError, DEFAULT_API_URL, DEFAULT_LIST_PATH, DEFAULT_STREAM_PATH,
    EndpointSettings, StreamSettings, parse_base_url,
};
