//! Discogs API integration

pub mod dto;
mod adapter;
mod client;

pub use adapter::{clean_name, composers, master_to_metadata, release_to_metadata, search_to_candidate};
pub use client::DiscogsClient;
