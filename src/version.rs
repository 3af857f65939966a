// Version information for the Sentence Embedding Node

/// Semantic version number, taken from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Endpoints served by this build
pub const FEATURES: &[&str] = &["single-embedding", "bulk-embedding", "similarity", "health"];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Sentence Embedding Node {}", VERSION)
}
