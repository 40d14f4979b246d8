//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → redirect sources loaded relative to the config file
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    LandingConfig, ListenerConfig, LogFormat, ObservabilityConfig, RedirectSourceConfig,
    RedirectSourceKind, RewriteConfig, SiteConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::ValidationError;
