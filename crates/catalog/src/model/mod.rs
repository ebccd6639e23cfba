//! Domain types for the widget catalog.
//!
//! These types represent validated domain objects separate from the stored
//! row types in [`crate::repository::rows`].

pub mod profile;
pub mod taxonomy;
pub mod widget;

pub use profile::UserProfile;
pub use taxonomy::{Category, Tag};
pub use widget::{NewWidget, ThumbnailUpload, Widget, WidgetCollection};
