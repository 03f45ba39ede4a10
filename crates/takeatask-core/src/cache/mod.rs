//! In-process caching.
//!
//! Only the tag list is cached: it is read by every task listing (for tag
//! colours) and changes rarely. The client invalidates it on any tag
//! mutation.

pub mod tags;

pub use tags::{by_names, color_of, find_by_name, CachedData, TagCache};
