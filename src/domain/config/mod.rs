//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_ENDPOINT, DEFAULT_MAX_DURATION_SECS, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_TIMEOUT_SECS,
};
