//! Spotify Web API integration
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;

pub use adapter::{album_to_candidate, album_to_metadata, track_to_candidate, track_to_metadata};
pub use client::SpotifyClient;
