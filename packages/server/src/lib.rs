// URL Triage Service - API Core
//
// This crate provides the backend API for sandboxed URL safety analysis.
// Suspicious URLs are visited inside an isolated browser container, cross
// referenced against reputation and network intelligence services, and
// summarized into a human-readable risk report by a background pipeline.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
