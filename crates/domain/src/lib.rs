//! Captive DNS Domain Layer
pub mod config;
pub mod domain_table;
pub mod errors;

pub use config::{CliOverrides, Config, ConfigError, DomainEntry};
pub use domain_table::{build_domain_table, DomainRecord, DomainTable, NamePattern};
pub use errors::DomainError;
