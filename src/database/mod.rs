pub mod file;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use file::FileStore;
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::Store;
