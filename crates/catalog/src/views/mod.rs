//! View assemblers.
//!
//! Each assembler binds one data source to the query pipeline: `load` does
//! the async repository reads and returns an immutable snapshot, `view` is a
//! pure render of that snapshot through a query. Callers re-run `view` as
//! the query changes without touching the store again.

pub mod community;
pub mod dashboard;
pub mod favorites;
pub mod recent;

pub use community::{CommunityAssembler, CommunitySnapshot};
pub use dashboard::{DashboardAssembler, DashboardSnapshot, DashboardStats, DashboardView};
pub use favorites::FavoritesAssembler;
pub use recent::{RecentAssembler, RecentSnapshot, RecentSource};
