pub mod error;
pub mod filter;
pub mod stats;
pub mod types;

pub use error::FilterError;
pub use filter::{ProjectFilter, ProjectQuery};
pub use stats::{AdminStats, OwnerStats, ProjectStats};
pub use types::{Choice, PriorityFilter, StatusFilter};
