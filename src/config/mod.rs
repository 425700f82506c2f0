//! Configuration module for the annotator.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for language
//! gating, resolution and the cache, `AppPaths` for cross-platform
//! directories, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, CacheConfig, DocumentConfig, ResolverConfig};
