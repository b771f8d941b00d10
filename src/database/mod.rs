pub mod manager;
pub mod memory;
pub mod models;
pub mod page;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use page::{Page, PageRequest};
pub use postgres::PgStore;
pub use store::{
    CelestialObjectStore, MapStore, StoreError, StoreHealth, StoreResult, UserStore,
};
