//! Media recommendation service.
//!
//! Users rate movies and TV shows and keep a watchlist; recommendations come
//! from a content-based engine that embeds item descriptions and ranks them
//! against the centroid of the user's liked items.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
