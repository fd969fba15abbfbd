// App configuration and process setup shared by the CLI binary
pub mod config;
pub mod logging;

pub use config::{AppConfig, AuditConfig, ConfigError, SharingConfig};
