//! Framed Runtime - bootstrap layer for the Framed command framework.
//!
//! This crate provides:
//! - Layered configuration loading (`framed.toml`, `FRAMED_*` env vars) and validation
//! - Logging initialization over `tracing-subscriber`
//! - [`FramedRuntime`], which wires configuration, plugins and the dispatcher together
//!
//! ```ignore
//! use framed_runtime::FramedRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FramedRuntime::new()?;
//!     runtime.register_manifest();
//!     runtime.start();
//!
//!     // Hand every message from the platform adapter to the runtime
//!     runtime.handle(&inbound).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, FramedConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{FramedRuntime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for use by plugin crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and the `instrument` attribute.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
