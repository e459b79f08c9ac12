//! Open Fashion Core - Shared types library.
//!
//! This crate provides common types used across the Open Fashion components:
//! - `storefront` - Catalog feed, cart store and storage backends
//! - `cli` - Terminal front-end driving the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
