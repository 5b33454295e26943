pub mod in_memory;
pub mod postgres;
mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{LedgerStore, OrderStore, StoreError};
