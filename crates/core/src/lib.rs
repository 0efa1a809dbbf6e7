//! Core library for devcontainer manifests
//!
//! This crate decodes `devcontainer.json` documents into a typed, normalized
//! [`Manifest`](manifest::Manifest). Fields that accept a shorthand (a string
//! or a list, optionally a bare integer) are collapsed into one ordered list
//! representation at decode time. Loading from disk, logging setup and output
//! helpers for the CLI live here as well.

pub mod errors;
pub mod host_requirements;
pub mod io;
pub mod loader;
pub mod logging;
pub mod manifest;
pub mod shorthand;

// Re-export IndexMap for use by dependent crates (preserves insertion order for ordered maps)
pub use indexmap::IndexMap;

/// Get the version of the core library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
