pub mod catalog;
pub mod config;
pub mod core;
pub mod prompt;
pub mod providers;
pub mod records;
pub mod registry;
pub mod runtime;
pub mod service;
pub mod session;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::{ClientConfig, ServiceConfig};
pub use core::types::*;
pub use runtime::{ProviderRuntime, ProviderRuntimeBuilder};
pub use session::ComparisonSession;
