//! Host API clients

pub mod mediafire_api;

pub use mediafire_api::{MAX_CHUNKS, MediafireApi};
