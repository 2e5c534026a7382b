//! Remote document database: the surface, the typed adapter over it and
//! an in-memory reference backend.

mod adapter;
mod db;
mod memory;

pub use adapter::{add, fetch_all, remove, update};
pub use db::{DocumentDatabase, RemoteDocument, WriteBatch, USER_ID_FIELD};
pub use memory::MemoryDatabase;
