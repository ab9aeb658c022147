pub mod memstore;
pub mod storage;

pub use memstore::MemStorage;
pub use storage::{Storage, StoreError};
