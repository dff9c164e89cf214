//! REST client for the StoryShelf content service.
//!
//! `HttpStorySource` implements `sync::StorySource` so the reconciliation
//! engine can refresh a profile's stories over HTTP. Authentication is the
//! host application's job; it only hands over a bearer token.

pub mod client;
pub mod error;

pub use client::{HttpStorySource, DEFAULT_API_BASE_URL};
pub use error::ApiError;
