//! Open Fashion Storefront library.
//!
//! The client-side core of the storefront: a paginated, searchable catalog
//! feed and a persisted shopping cart. Rendering is left to front-ends such
//! as the `ofs` CLI.
//!
//! # Modules
//!
//! - [`catalog`] - Catalog API client and paginated feed
//! - [`cart`] - Line items, totals, and the persisted cart store
//! - [`storage`] - Key-value backends the cart persists to
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Unified error type for front-ends

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
