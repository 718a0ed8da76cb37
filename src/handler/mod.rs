//! Request handler module
//!
//! Routing dispatch plus the feature page and stored artifact handlers.

mod pages;
pub mod router;
mod static_files;

// Re-export main entry point
pub use router::handle_request;
