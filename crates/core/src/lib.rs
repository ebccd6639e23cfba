//! WidgetVault Core - Shared types library.
//!
//! This crate provides common types used across all WidgetVault components:
//! - `catalog` - The widget catalog engine (queries, creation, views)
//! - `integration-tests` - Cross-component test flows
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no store access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, slugs, and visibility

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
