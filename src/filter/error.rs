use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("Invalid priority filter: {0}")]
    InvalidPriority(String),

    #[error("Search term too long: {0} characters")]
    SearchTooLong(usize),
}
