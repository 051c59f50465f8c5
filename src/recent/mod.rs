pub mod set;
pub mod tracker;

pub use set::{ItemKind, ItemRef, RecentSet, RECENT_CAPACITY};
pub use tracker::RecentTracker;
