//! WidgetVault catalog library.
//!
//! Everything needed to run a widget catalog against a hosted row and asset
//! store: the repository, the creation flow, favorite toggling, the pure
//! query pipeline, and the per-screen view assemblers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assets;
pub mod config;
pub mod creation;
pub mod error;
pub mod favorites;
pub mod model;
pub mod query;
pub mod repository;
pub mod session;
pub mod store;
pub mod views;
