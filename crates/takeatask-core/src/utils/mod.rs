//! Display formatting and local pagination helpers.

pub mod format;
pub mod page;

pub use format::{format_date, format_date_time, format_file_size, initials, truncate_string};
pub use page::{paginate, Page};
