pub mod domains;
pub mod list;
pub mod storage;
pub mod store;

pub use domains::*;
pub use list::{ListDomain, ListState, PersistedListState};
pub use storage::{FileStorage, MemoryStorage, StateStorage};
pub use store::{FetchTicket, Store, StoreState};
