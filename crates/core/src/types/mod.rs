//! Core types for WidgetVault.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod slug;
pub mod visibility;

pub use id::*;
pub use slug::{Slug, SlugError};
pub use visibility::Visibility;
