//! TIDAL API integration

pub mod dto;
mod adapter;
mod client;

pub use adapter::{album_to_candidate, album_to_metadata, artwork_url, composers, track_to_candidate, track_to_metadata};
pub use client::TidalClient;
