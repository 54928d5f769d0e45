//! # Linkstash API Server Library
//!
//! Core functionality for the Linkstash API server: a personal bookmark
//! manager with collections, tags, search, and an archive-then-delete
//! bookmark lifecycle.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `metadata`: Page metadata fetching for bookmark enrichment
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod metadata;
pub mod middleware;
pub mod routes;
