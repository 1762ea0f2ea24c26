//! Qobuz API integration

pub mod dto;
mod adapter;
mod client;

pub use adapter::{Credits, album_to_candidate, album_to_metadata, track_to_candidate, track_to_metadata};
pub use client::QobuzClient;
