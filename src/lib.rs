//! Newsreel - a paginated news feed client.
//!
//! This crate loads a remote news feed page by page and resolves article
//! images through a shared in-memory cache, binding them to recycled list
//! rows without ever showing an image on the wrong row.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the pagination and image-slot controllers.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing the headless list view.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
